/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use videira_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = videira_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::middleware::{guard::role_guard, security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use videira_shared::auth::middleware::{authenticate_request, AuthError};
use videira_shared::models::profile::Role;

use crate::config::Config;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// ├── /v1/                          # API v1 (versioned)
/// │   ├── /auth/                    # Authentication (public)
/// │   │   ├── POST /register
/// │   │   ├── POST /confirm-email
/// │   │   ├── POST /login
/// │   │   ├── POST /refresh
/// │   │   ├── POST /logout
/// │   │   ├── POST /reset-password
/// │   │   └── POST /reset-password/confirm
/// │   ├── /profiles/me              # Own profile (any authenticated)
/// │   ├── /devotional/today         # Daily devotional (any authenticated)
/// │   ├── /disciples, /notes,       # Discipleship (discipler+)
/// │   │   /meetings, /reports
/// │   └── /profiles, /profiles/:id  # Administration (master only)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication + role guard (per route group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/confirm-email", post(routes::auth::confirm_email))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout))
        .route("/reset-password", post(routes::auth::reset_password))
        .route(
            "/reset-password/confirm",
            post(routes::auth::confirm_reset_password),
        );

    // Routes any authenticated identity may use, profile or not
    let session_routes = Router::new()
        .route(
            "/profiles/me",
            get(routes::profiles::get_me).put(routes::profiles::update_me),
        )
        .route("/devotional/today", get(routes::devotional::today))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Discipleship routes (require discipler role or above)
    let discipler_routes = Router::new()
        .route(
            "/disciples",
            get(routes::disciples::list_disciples).post(routes::disciples::register_disciple),
        )
        .route(
            "/disciples/:id/notes",
            get(routes::disciples::list_notes).post(routes::disciples::create_note),
        )
        .route("/notes/:id", put(routes::disciples::update_note))
        .route(
            "/meetings",
            get(routes::meetings::list_meetings).post(routes::meetings::create_meeting),
        )
        .route("/meetings/:id", put(routes::meetings::update_meeting))
        .route(
            "/meetings/:id/members",
            get(routes::meetings::list_members).post(routes::meetings::add_member),
        )
        .route(
            "/meetings/:id/members/:disciple_id",
            axum::routing::delete(routes::meetings::remove_member),
        )
        .route(
            "/meetings/:id/attendance",
            get(routes::meetings::list_attendance).put(routes::meetings::mark_attendance),
        )
        .route(
            "/reports",
            get(routes::reports::list_reports).post(routes::reports::create_report),
        )
        .route("/reports/:id", get(routes::reports::get_report))
        .layer(axum::middleware::from_fn(role_guard(
            state.clone(),
            Some(Role::Discipler),
        )))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Administration routes (require master role)
    let master_routes = Router::new()
        .route("/profiles", get(routes::profiles::list_profiles))
        .route(
            "/profiles/:id/discipler",
            post(routes::profiles::assign_discipler),
        )
        .route("/profiles/:id/role", post(routes::profiles::set_role))
        .layer(axum::middleware::from_fn(role_guard(
            state.clone(),
            Some(Role::Master),
        )))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(session_routes)
        .merge(discipler_routes)
        .merge(master_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Establishes identity from the Authorization header and injects the
/// `AuthContext` into request extensions. A missing credential answers
/// with the login-path redirect so the client knows where to send the
/// user; a present-but-invalid one is a plain 401.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context =
        authenticate_request(req.headers(), state.jwt_secret()).map_err(|e| match e {
            AuthError::MissingCredentials => crate::error::ApiError::RedirectLogin {
                message: "Missing authorization header".to_string(),
                redirect: state.config.auth.login_path.clone(),
            },
            other => other.into(),
        })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration and email confirmation
/// - Login
/// - Token refresh
/// - Logout
/// - Password reset
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/confirm-email` - Confirm email address
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/logout` - Clear credential (best-effort)
/// - `POST /v1/auth/reset-password` - Request a password reset token
/// - `POST /v1/auth/reset-password/confirm` - Consume token, set new password
///
/// Error messages on the credential paths are classified and safe to show
/// verbatim: "Incorrect email or password", "Email not confirmed",
/// "Email already registered", "Password must be at least 6 characters".

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use videira_shared::{
    auth::{jwt, password},
    models::{
        one_time_token::{OneTimeToken, TokenPurpose},
        profile::{CreateProfile, Profile, Role},
        user::{CreateUser, User},
    },
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Register response
///
/// No tokens are issued yet: the account must confirm its email address
/// before it can log in.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Profile ID
    pub profile_id: String,

    /// Whether email confirmation is still pending
    pub confirmation_required: bool,
}

/// Email confirmation request
#[derive(Debug, Deserialize)]
pub struct ConfirmEmailRequest {
    /// Confirmation token from the email
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Email address of the account
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation request
#[derive(Debug, Deserialize)]
pub struct ConfirmResetRequest {
    /// Reset token from the email
    pub token: String,

    /// New password
    pub new_password: String,
}

/// Registers a new user
///
/// Creates the credential and a disciple profile linked to it, then
/// issues an email-confirmation token. New accounts always start as
/// disciples; promotion is a master operation.
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed / weak password
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    // Create user
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            password_hash,
            name: Some(req.name.clone()),
        },
    )
    .await?;

    // Create the matching profile (a new account starts as a disciple)
    let profile = Profile::create(
        &state.db,
        CreateProfile {
            user_id: Some(user.id),
            name: req.name,
            email: Some(req.email),
            phone: None,
            role: Role::Disciple,
            discipler_id: None,
            spiritual_stage: None,
        },
    )
    .await?;

    // Issue the confirmation token
    let (_row, _token) = OneTimeToken::issue(&state.db, user.id, TokenPurpose::EmailVerify).await?;

    // TODO: deliver the confirmation token by email once a mailer is wired up
    tracing::info!(user_id = %user.id, "new user registered, confirmation pending");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id.to_string(),
            profile_id: profile.id.to_string(),
            confirmation_required: true,
        }),
    ))
}

/// Confirms a user's email address
///
/// Consumes the confirmation token issued at registration.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid, expired, or already-used token
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(req): Json<ConfirmEmailRequest>,
) -> ApiResult<StatusCode> {
    // Consume and verify in one transaction so a failed update can't
    // burn the token
    let mut tx = state.db.begin().await?;

    let user_id = OneTimeToken::consume(&mut *tx, &req.token, TokenPurpose::EmailVerify)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired confirmation token".to_string()))?;

    User::mark_email_verified(&mut *tx, user_id).await?;

    tx.commit().await?;

    tracing::info!(%user_id, "email confirmed");

    Ok(StatusCode::NO_CONTENT)
}

/// Login endpoint
///
/// Authenticates a user and returns JWT tokens. Failure messages are
/// classified: a wrong email and a wrong password produce the same
/// response, while an unconfirmed email is reported distinctly.
///
/// # Errors
///
/// - `401 Unauthorized`: "Incorrect email or password" / "Email not confirmed"
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    }

    if !user.email_verified {
        return Err(ApiError::Unauthorized("Email not confirmed".to_string()));
    }

    // Update last login
    User::update_last_login(&state.db, user.id).await?;

    // Generate tokens
    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Logout endpoint
///
/// Tokens are stateless, so there is nothing to revoke server-side; the
/// client discards its tokens. Always succeeds so callers never have to
/// handle a logout failure.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Requests a password reset
///
/// Responds 202 whether or not the email has an account, so the endpoint
/// cannot be used to probe for registered addresses.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        let (_row, _token) =
            OneTimeToken::issue(&state.db, user.id, TokenPurpose::PasswordReset).await?;

        // TODO: deliver the reset token by email once a mailer is wired up
        tracing::info!(user_id = %user.id, "password reset token issued");
    } else {
        tracing::debug!("password reset requested for unknown email");
    }

    Ok(StatusCode::ACCEPTED)
}

/// Confirms a password reset
///
/// Consumes a reset token (single use, time-limited) and sets the new
/// password in the same transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid, expired, or already-used token
/// - `422 Unprocessable Entity`: Weak password
pub async fn confirm_reset_password(
    State(state): State<AppState>,
    Json(req): Json<ConfirmResetRequest>,
) -> ApiResult<StatusCode> {
    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.new_password)?;

    // Consume and update in one transaction: a failure after the token
    // is marked used would otherwise strand the user with neither a
    // usable token nor a new password
    let mut tx = state.db.begin().await?;

    let user_id = OneTimeToken::consume(&mut *tx, &req.token, TokenPurpose::PasswordReset)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    User::update_password(&mut *tx, user_id, &password_hash).await?;

    tx.commit().await?;

    tracing::info!(%user_id, "password reset completed");

    Ok(StatusCode::NO_CONTENT)
}

/// Role-based access guard
///
/// Gates protected routes on two conditions evaluated in order: an
/// authenticated identity must be present, and when a route names a
/// required role the caller's profile must satisfy it. The decision
/// function is pure and covers the full state machine:
///
/// ```text
/// LOADING -> (AUTHENTICATED_AUTHORIZED | AUTHENTICATED_UNAUTHORIZED | UNAUTHENTICATED)
/// ```
///
/// Terminal states map to one outcome each: allow the request through,
/// 403 with the landing-page redirect, or 401 with the login redirect.
/// The guard runs per request, after auth extraction, so role changes
/// take effect on the next request without token re-issue.

use axum::{extract::Request, middleware::Next, response::Response};

use videira_shared::auth::authorization::{require_profile, AuthzError};
use videira_shared::auth::middleware::AuthContext;
use videira_shared::models::profile::Role;
use videira_shared::session::SessionState;

use crate::{app::AppState, error::ApiError};

/// Outcome of evaluating the gate for one request
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Session state not yet known; render nothing
    Pending,

    /// No authenticated identity; send to the login entry point
    RedirectLogin,

    /// Identity present but role requirement unsatisfied; send to landing
    Forbidden,

    /// All checks passed
    Allow,
}

/// Evaluates the gate for a session state and an optional role requirement
///
/// `None` session means the state is still being resolved. An
/// authenticated caller without a profile passes routes that require no
/// role, and is forbidden from routes that do: no profile means no role.
pub fn evaluate_gate(session: Option<&SessionState>, required: Option<Role>) -> GateDecision {
    let Some(state) = session else {
        return GateDecision::Pending;
    };

    if !state.is_authenticated() {
        return GateDecision::RedirectLogin;
    }

    match required {
        None => GateDecision::Allow,
        Some(required_role) => match state.profile() {
            Some(profile) if profile.role.satisfies(required_role) => GateDecision::Allow,
            _ => GateDecision::Forbidden,
        },
    }
}

/// Axum layer gating a route group behind a minimum role
///
/// Runs after JWT auth extraction: reads the `AuthContext` extension,
/// resolves the caller's profile (zero-or-one), evaluates the gate, and
/// on `Allow` injects the `Profile` into request extensions for handlers.
pub fn role_guard(
    state: AppState,
    required: Option<Role>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, ApiError>> + Send>> + Clone {
    move |req, next| {
        let state = state.clone();
        Box::pin(guard_request(state, required, req, next))
    }
}

async fn guard_request(
    state: AppState,
    required: Option<Role>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = match req.extensions().get::<AuthContext>() {
        Some(auth) => match require_profile(&state.db, auth.user_id).await {
            Ok(profile) => SessionState::Authenticated { profile },
            // Profile-less identities are a valid state, not an error;
            // the gate decides whether the route admits them.
            Err(AuthzError::NoProfile(user_id)) => {
                SessionState::AuthenticatedNoProfile { user_id }
            }
            Err(err) => return Err(err.into()),
        },
        None => SessionState::Unauthenticated,
    };

    match evaluate_gate(Some(&session), required) {
        GateDecision::Allow => {
            if let Some(profile) = session.profile() {
                req.extensions_mut().insert(profile.clone());
            }
            Ok(next.run(req).await)
        }
        GateDecision::RedirectLogin | GateDecision::Pending => Err(ApiError::RedirectLogin {
            message: "Sign in required".to_string(),
            redirect: state.config.auth.login_path.clone(),
        }),
        GateDecision::Forbidden => Err(ApiError::RedirectLanding {
            message: "Insufficient role for this resource".to_string(),
            redirect: state.config.auth.landing_path.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use videira_shared::models::profile::Profile;

    fn profile_with_role(role: Role) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            name: "Test".to_string(),
            email: None,
            phone: None,
            role,
            discipler_id: None,
            spiritual_stage: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn authenticated(role: Role) -> SessionState {
        SessionState::Authenticated {
            profile: profile_with_role(role),
        }
    }

    #[test]
    fn test_loading_is_pending() {
        assert_eq!(evaluate_gate(None, None), GateDecision::Pending);
        assert_eq!(
            evaluate_gate(None, Some(Role::Discipler)),
            GateDecision::Pending
        );
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let state = SessionState::Unauthenticated;

        assert_eq!(
            evaluate_gate(Some(&state), None),
            GateDecision::RedirectLogin
        );
        assert_eq!(
            evaluate_gate(Some(&state), Some(Role::Disciple)),
            GateDecision::RedirectLogin
        );
    }

    #[test]
    fn test_no_role_requirement_admits_any_identity() {
        let with_profile = authenticated(Role::Disciple);
        assert_eq!(evaluate_gate(Some(&with_profile), None), GateDecision::Allow);

        let without_profile = SessionState::AuthenticatedNoProfile {
            user_id: Uuid::new_v4(),
        };
        assert_eq!(
            evaluate_gate(Some(&without_profile), None),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_missing_profile_fails_role_requirement() {
        let state = SessionState::AuthenticatedNoProfile {
            user_id: Uuid::new_v4(),
        };

        assert_eq!(
            evaluate_gate(Some(&state), Some(Role::Disciple)),
            GateDecision::Forbidden
        );
    }

    #[test]
    fn test_full_role_matrix() {
        let roles = [Role::Disciple, Role::Discipler, Role::Master];

        for user_role in roles {
            for required in roles {
                let state = authenticated(user_role);
                let decision = evaluate_gate(Some(&state), Some(required));

                if user_role.satisfies(required) {
                    assert_eq!(decision, GateDecision::Allow, "{user_role:?} vs {required:?}");
                } else {
                    assert_eq!(
                        decision,
                        GateDecision::Forbidden,
                        "{user_role:?} vs {required:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_disciple_forbidden_from_discipler_route() {
        let state = authenticated(Role::Disciple);

        assert_eq!(
            evaluate_gate(Some(&state), Some(Role::Discipler)),
            GateDecision::Forbidden
        );
    }
}

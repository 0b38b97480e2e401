/// Authorization helpers and permission checks
///
/// Access control built on the profile record. Identity comes from the
/// JWT; the role lives on the profile, so `require_profile` resolves the
/// profile for an authenticated user and the per-record checks compare
/// against it (hierarchical role gating lives in `Role::satisfies`).
///
/// An authenticated user without a profile is a distinct case from an
/// unauthenticated one: their token is valid but no role can be
/// established, so resolution fails with `AuthzError::NoProfile`.
///
/// # Example
///
/// ```no_run
/// use videira_shared::auth::authorization::require_profile;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn check(pool: &PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     let profile = require_profile(pool, user_id).await?;
///     println!("authenticated as {}", profile.name);
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::{Profile, Role};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Authenticated user has no profile record
    #[error("No profile found for user {0}")]
    NoProfile(Uuid),

    /// User doesn't have access to the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Loads the profile for an authenticated user
///
/// # Errors
///
/// Returns `AuthzError::NoProfile` if no profile row references the user
pub async fn require_profile(pool: &PgPool, user_id: Uuid) -> Result<Profile, AuthzError> {
    Profile::find_by_user_id(pool, user_id)
        .await?
        .ok_or(AuthzError::NoProfile(user_id))
}

/// Checks if a viewer may access a disciple's records
///
/// Access is granted when the viewer:
/// - is a master, OR
/// - is the disciple's assigned discipler, OR
/// - is the disciple themselves
pub fn check_disciple_access(viewer: &Profile, disciple: &Profile) -> Result<(), AuthzError> {
    if viewer.role == Role::Master {
        return Ok(());
    }

    if disciple.discipler_id == Some(viewer.id) {
        return Ok(());
    }

    if viewer.id == disciple.id {
        return Ok(());
    }

    Err(AuthzError::NotAuthorized)
}

/// Checks if a viewer owns a record they authored
///
/// Masters bypass the ownership check.
pub fn check_ownership(viewer: &Profile, author_id: Uuid) -> Result<(), AuthzError> {
    if viewer.role == Role::Master || viewer.id == author_id {
        return Ok(());
    }

    Err(AuthzError::NotAuthorized)
}

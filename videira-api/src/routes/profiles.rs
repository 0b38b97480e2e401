/// Profile endpoints
///
/// Own-profile routes for any authenticated identity plus the master-only
/// administration routes (listing, discipler assignment, role changes).
///
/// # Endpoints
///
/// - `GET  /v1/profiles/me` - Session snapshot (profile may be absent)
/// - `PUT  /v1/profiles/me` - Update own profile
/// - `GET  /v1/profiles` - List all profiles (master)
/// - `POST /v1/profiles/:id/discipler` - Assign or clear a discipler (master)
/// - `POST /v1/profiles/:id/role` - Promote or demote (master)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use videira_shared::{
    auth::middleware::AuthContext,
    models::profile::{Profile, Role, UpdateProfile},
};

/// Session snapshot returned by `GET /v1/profiles/me`
///
/// An authenticated identity without a profile row is a valid state (a
/// fresh registration, or a credential whose profile was never created),
/// so `profile` is an explicit nullable field, not a 404.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The profile, if one exists
    pub profile: Option<Profile>,
}

/// Own-profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New contact phone
    pub phone: Option<String>,

    /// New spiritual-stage label
    pub spiritual_stage: Option<String>,
}

/// Discipler assignment request (None clears the assignment)
#[derive(Debug, Deserialize)]
pub struct AssignDisciplerRequest {
    /// Profile ID of the discipler, or null to clear
    pub discipler_id: Option<Uuid>,
}

/// Role change request
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// New role
    pub role: Role,
}

/// Returns the caller's session snapshot
///
/// Never fails on a missing profile; the body carries an explicit null.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let profile = Profile::find_by_user_id(&state.db, auth.user_id).await?;

    Ok(Json(MeResponse {
        user_id: auth.user_id,
        profile,
    }))
}

/// Updates the caller's own profile
///
/// # Errors
///
/// - `404 Not Found`: The caller has no profile yet
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<Profile>> {
    req.validate()?;

    let profile = Profile::find_by_user_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No profile for this account yet".to_string()))?;

    let updated = Profile::update(
        &state.db,
        profile.id,
        UpdateProfile {
            name: req.name,
            email: req.email.map(Some),
            phone: req.phone.map(Some),
            spiritual_stage: req.spiritual_stage.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(updated))
}

/// Lists all profiles (master only)
pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<Json<Vec<Profile>>> {
    let profiles = Profile::list(&state.db).await?;

    Ok(Json(profiles))
}

/// Assigns (or clears) a profile's discipler (master only)
///
/// # Errors
///
/// - `404 Not Found`: Profile does not exist
/// - `400 Bad Request`: Referenced discipler cannot disciple
pub async fn assign_discipler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignDisciplerRequest>,
) -> ApiResult<Json<Profile>> {
    let updated = Profile::assign_discipler(&state.db, id, req.discipler_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::BadRequest(
                "Discipler must hold the discipler or master role".to_string(),
            ),
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    tracing::info!(profile_id = %id, discipler_id = ?req.discipler_id, "discipler assigned");

    Ok(Json(updated))
}

/// Changes a profile's role (master only)
///
/// Demotion to disciple also clears any disciples still pointing at the
/// profile, keeping the discipler linkage invariant intact.
///
/// # Errors
///
/// - `404 Not Found`: Profile does not exist
pub async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> ApiResult<Json<Profile>> {
    let updated = Profile::set_role(&state.db, id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    tracing::info!(profile_id = %id, role = %req.role.as_str(), "role changed");

    Ok(Json(updated))
}

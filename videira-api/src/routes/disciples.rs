/// Disciple roster and discipleship note endpoints
///
/// All routes here sit behind the discipler role guard, which injects the
/// caller's `Profile` into request extensions.
///
/// # Endpoints
///
/// - `GET  /v1/disciples` - List the caller's disciples (all, for masters)
/// - `POST /v1/disciples` - Register a disciple without a login credential
/// - `GET  /v1/disciples/:id/notes` - Notes about a disciple
/// - `POST /v1/disciples/:id/notes` - Write a note
/// - `PUT  /v1/notes/:id` - Edit a note (author or master)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use videira_shared::{
    auth::authorization::{check_disciple_access, check_ownership},
    models::{
        note::{CreateNote, Note, UpdateNote},
        profile::{CreateProfile, Profile, Role},
    },
};

/// Disciple registration request
///
/// Creates a profile with no linked credential; the person can later
/// register a login and the master links it up.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterDiscipleRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Spiritual-stage label
    pub spiritual_stage: Option<String>,
}

/// Note creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    /// Main note content
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    /// Free-form observations
    pub observations: Option<String>,

    /// Prayer requests
    pub prayer_requests: Option<String>,
}

/// Note update request
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    /// New content
    pub content: Option<String>,

    /// New observations
    pub observations: Option<String>,

    /// New prayer requests
    pub prayer_requests: Option<String>,
}

/// Lists the caller's disciples
///
/// Disciplers see their own roster; masters see every disciple.
pub async fn list_disciples(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
) -> ApiResult<Json<Vec<Profile>>> {
    let disciples = if viewer.role == Role::Master {
        Profile::list_by_role(&state.db, Role::Disciple).await?
    } else {
        Profile::list_by_discipler(&state.db, viewer.id).await?
    };

    Ok(Json(disciples))
}

/// Registers a disciple under the calling discipler
///
/// The new profile has no credential; `user_id` stays null until the
/// person registers a login of their own.
pub async fn register_disciple(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Json(req): Json<RegisterDiscipleRequest>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    req.validate()?;

    let profile = Profile::create(
        &state.db,
        CreateProfile {
            user_id: None,
            name: req.name,
            email: req.email,
            phone: req.phone,
            role: Role::Disciple,
            discipler_id: Some(viewer.id),
            spiritual_stage: req.spiritual_stage,
        },
    )
    .await?;

    tracing::info!(disciple_id = %profile.id, discipler_id = %viewer.id, "disciple registered");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Lists notes about a disciple
///
/// # Errors
///
/// - `404 Not Found`: Disciple does not exist
/// - `403 Forbidden`: Caller is not the disciple's discipler (or master)
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Note>>> {
    let disciple = Profile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Disciple not found".to_string()))?;

    check_disciple_access(&viewer, &disciple)?;

    let notes = Note::list_by_disciple(&state.db, disciple.id).await?;

    Ok(Json(notes))
}

/// Writes a note about a disciple
///
/// The caller becomes the authoring discipler.
pub async fn create_note(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    req.validate()?;

    let disciple = Profile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Disciple not found".to_string()))?;

    check_disciple_access(&viewer, &disciple)?;

    let note = Note::create(
        &state.db,
        CreateNote {
            disciple_id: disciple.id,
            discipler_id: viewer.id,
            content: req.content,
            observations: req.observations,
            prayer_requests: req.prayer_requests,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// Edits a note
///
/// Only the authoring discipler (or a master) may edit.
///
/// # Errors
///
/// - `404 Not Found`: Note does not exist
/// - `403 Forbidden`: Caller did not author the note
pub async fn update_note(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    let note = Note::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    check_ownership(&viewer, note.discipler_id)?;

    let updated = Note::update(
        &state.db,
        note.id,
        UpdateNote {
            content: req.content,
            observations: req.observations.map(Some),
            prayer_requests: req.prayer_requests.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(updated))
}

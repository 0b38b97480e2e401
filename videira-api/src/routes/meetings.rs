/// Group meeting endpoints
///
/// Meetings, their member rosters, and the attendance checklist. All
/// routes sit behind the discipler role guard. The listing is always
/// scoped to the caller's own meetings; per-meeting routes check
/// ownership, which masters bypass.
///
/// # Endpoints
///
/// - `GET    /v1/meetings` - List the caller's meetings
/// - `POST   /v1/meetings` - Create a meeting
/// - `PUT    /v1/meetings/:id` - Update a meeting
/// - `GET    /v1/meetings/:id/members` - Member roster
/// - `POST   /v1/meetings/:id/members` - Add a disciple to the roster
/// - `DELETE /v1/meetings/:id/members/:disciple_id` - Remove from roster
/// - `GET    /v1/meetings/:id/attendance` - Attendance records + headcount
/// - `PUT    /v1/meetings/:id/attendance` - Mark present/absent (upsert)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use videira_shared::{
    auth::authorization::check_ownership,
    models::{
        attendance::Attendance,
        meeting::{CreateGroupMeeting, GroupMeeting, GroupMember, UpdateGroupMeeting},
        profile::Profile,
    },
};

/// Meeting creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetingRequest {
    /// Group name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Current theme
    pub theme: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Scheduled date/time
    pub meeting_date: Option<DateTime<Utc>>,

    /// Duration in minutes
    pub duration: Option<i32>,
}

/// Meeting update request
#[derive(Debug, Deserialize)]
pub struct UpdateMeetingRequest {
    /// New group name
    pub name: Option<String>,

    /// New theme
    pub theme: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New scheduled date/time
    pub meeting_date: Option<DateTime<Utc>>,

    /// New duration in minutes
    pub duration: Option<i32>,
}

/// Member addition request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// Disciple profile to add
    pub disciple_id: Uuid,
}

/// Attendance mark request
#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    /// Disciple being marked
    pub disciple_id: Uuid,

    /// Present or absent
    pub present: bool,

    /// Optional per-disciple notes
    pub notes: Option<String>,
}

/// Attendance listing with headcount
#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    /// Individual records
    pub records: Vec<Attendance>,

    /// Number of disciples marked present
    pub present_count: i64,
}

/// Loads a meeting and checks the caller may act on it
async fn owned_meeting(
    state: &AppState,
    viewer: &Profile,
    id: Uuid,
) -> ApiResult<GroupMeeting> {
    let meeting = GroupMeeting::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    check_ownership(viewer, meeting.discipler_id)?;

    Ok(meeting)
}

/// Lists the caller's meetings
pub async fn list_meetings(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
) -> ApiResult<Json<Vec<GroupMeeting>>> {
    let meetings = GroupMeeting::list_by_discipler(&state.db, viewer.id).await?;

    Ok(Json(meetings))
}

/// Creates a meeting owned by the caller
pub async fn create_meeting(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Json(req): Json<CreateMeetingRequest>,
) -> ApiResult<(StatusCode, Json<GroupMeeting>)> {
    req.validate()?;

    let meeting = GroupMeeting::create(
        &state.db,
        CreateGroupMeeting {
            discipler_id: viewer.id,
            name: req.name,
            theme: req.theme,
            description: req.description,
            meeting_date: req.meeting_date,
            duration: req.duration,
        },
    )
    .await?;

    tracing::info!(meeting_id = %meeting.id, discipler_id = %viewer.id, "meeting created");

    Ok((StatusCode::CREATED, Json(meeting)))
}

/// Updates a meeting the caller owns
pub async fn update_meeting(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMeetingRequest>,
) -> ApiResult<Json<GroupMeeting>> {
    let meeting = owned_meeting(&state, &viewer, id).await?;

    let updated = GroupMeeting::update(
        &state.db,
        meeting.id,
        UpdateGroupMeeting {
            name: req.name,
            theme: req.theme.map(Some),
            description: req.description.map(Some),
            meeting_date: req.meeting_date.map(Some),
            duration: req.duration.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    Ok(Json(updated))
}

/// Lists the member roster of a meeting
pub async fn list_members(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<GroupMember>>> {
    let meeting = owned_meeting(&state, &viewer, id).await?;

    let members = GroupMember::list_by_meeting(&state.db, meeting.id).await?;

    Ok(Json(members))
}

/// Adds a disciple to a meeting's roster
///
/// # Errors
///
/// - `404 Not Found`: Meeting or disciple does not exist
/// - `409 Conflict`: Disciple already on the roster
pub async fn add_member(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<GroupMember>)> {
    let meeting = owned_meeting(&state, &viewer, id).await?;

    Profile::find_by_id(&state.db, req.disciple_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Disciple not found".to_string()))?;

    let member = GroupMember::add(&state.db, meeting.id, req.disciple_id).await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// Removes a disciple from a meeting's roster
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path((id, disciple_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let meeting = owned_meeting(&state, &viewer, id).await?;

    let removed = GroupMember::remove(&state.db, meeting.id, disciple_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Lists attendance records and the present headcount for a meeting
pub async fn list_attendance(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AttendanceResponse>> {
    let meeting = owned_meeting(&state, &viewer, id).await?;

    let records = Attendance::list_by_meeting(&state.db, meeting.id).await?;
    let present_count = Attendance::count_present(&state.db, meeting.id).await?;

    Ok(Json(AttendanceResponse {
        records,
        present_count,
    }))
}

/// Marks a disciple present or absent for a meeting
///
/// Upsert: re-marking the same disciple updates the existing record, so
/// the checklist can be toggled freely. Only disciples on the meeting's
/// roster can be marked.
///
/// # Errors
///
/// - `404 Not Found`: Meeting does not exist, or the disciple is not on
///   the roster
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkAttendanceRequest>,
) -> ApiResult<Json<Attendance>> {
    let meeting = owned_meeting(&state, &viewer, id).await?;

    if !GroupMember::is_member(&state.db, meeting.id, req.disciple_id).await? {
        return Err(ApiError::NotFound(
            "Disciple is not a member of this meeting".to_string(),
        ));
    }

    let record = Attendance::mark(
        &state.db,
        meeting.id,
        req.disciple_id,
        req.present,
        req.notes,
    )
    .await?;

    Ok(Json(record))
}

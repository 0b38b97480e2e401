/// Meeting report endpoints
///
/// Free-text reports a discipler files after a meeting. Behind the
/// discipler role guard.
///
/// # Endpoints
///
/// - `GET  /v1/reports` - List the caller's reports
/// - `POST /v1/reports` - File a report
/// - `GET  /v1/reports/:id` - Fetch a single report

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use videira_shared::auth::authorization::check_ownership;
use videira_shared::models::{
    profile::Profile,
    report::{CreateMeetingReport, MeetingReport},
};

/// Report creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    /// Report title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Meeting type label (e.g., "célula")
    #[validate(length(min = 1, max = 100, message = "Meeting type must be 1-100 characters"))]
    pub meeting_type: String,

    /// Date the meeting took place
    pub meeting_date: NaiveDate,

    /// Narrative content
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    /// Headcount
    pub participants_count: Option<i32>,

    /// Opaque photo URL (storage is out of scope; the URL is carried as-is)
    pub photo_url: Option<String>,
}

/// Lists the caller's reports, newest meeting first
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
) -> ApiResult<Json<Vec<MeetingReport>>> {
    let reports = MeetingReport::list_by_discipler(&state.db, viewer.id).await?;

    Ok(Json(reports))
}

/// Files a new report for the caller
pub async fn create_report(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Json(req): Json<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<MeetingReport>)> {
    req.validate()?;

    let report = MeetingReport::create(
        &state.db,
        CreateMeetingReport {
            discipler_id: viewer.id,
            title: req.title,
            meeting_type: req.meeting_type,
            meeting_date: req.meeting_date,
            content: req.content,
            participants_count: req.participants_count,
            photo_url: req.photo_url,
        },
    )
    .await?;

    tracing::info!(report_id = %report.id, discipler_id = %viewer.id, "report filed");

    Ok((StatusCode::CREATED, Json(report)))
}

/// Fetches a single report. Only the author (or a master) may read it.
pub async fn get_report(
    State(state): State<AppState>,
    Extension(viewer): Extension<Profile>,
    Path(report_id): Path<Uuid>,
) -> ApiResult<Json<MeetingReport>> {
    let report = MeetingReport::find_by_id(&state.db, report_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    check_ownership(&viewer, report.discipler_id)?;

    Ok(Json(report))
}

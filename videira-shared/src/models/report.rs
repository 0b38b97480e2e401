/// Meeting report model and database operations
///
/// Free-text reports a discipler files after a meeting: type, date,
/// narrative content, headcount, and an optional photo URL (the photo
/// itself is stored elsewhere; only the URL is carried).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE meeting_reports (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     discipler_id UUID NOT NULL REFERENCES profiles(id),
///     title VARCHAR(255) NOT NULL,
///     meeting_type VARCHAR(100) NOT NULL,
///     meeting_date DATE NOT NULL,
///     content TEXT NOT NULL,
///     participants_count INTEGER,
///     photo_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A meeting report
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MeetingReport {
    /// Unique report ID
    pub id: Uuid,

    /// Reporting discipler's profile
    pub discipler_id: Uuid,

    /// Report title
    pub title: String,

    /// Meeting type label (e.g., "célula", "one-on-one")
    pub meeting_type: String,

    /// Date the meeting took place
    pub meeting_date: NaiveDate,

    /// Narrative content
    pub content: String,

    /// Headcount, if recorded
    pub participants_count: Option<i32>,

    /// Opaque URL of an uploaded photo
    pub photo_url: Option<String>,

    /// When the report was filed
    pub created_at: DateTime<Utc>,

    /// When the report was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for filing a new meeting report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingReport {
    /// Reporting discipler's profile
    pub discipler_id: Uuid,

    /// Report title
    pub title: String,

    /// Meeting type label
    pub meeting_type: String,

    /// Date the meeting took place
    pub meeting_date: NaiveDate,

    /// Narrative content
    pub content: String,

    /// Headcount
    pub participants_count: Option<i32>,

    /// Opaque photo URL
    pub photo_url: Option<String>,
}

impl MeetingReport {
    /// Files a new meeting report
    pub async fn create(pool: &PgPool, data: CreateMeetingReport) -> Result<Self, sqlx::Error> {
        let report = sqlx::query_as::<_, MeetingReport>(
            r#"
            INSERT INTO meeting_reports
                (discipler_id, title, meeting_type, meeting_date, content, participants_count, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, discipler_id, title, meeting_type, meeting_date, content,
                      participants_count, photo_url, created_at, updated_at
            "#,
        )
        .bind(data.discipler_id)
        .bind(data.title)
        .bind(data.meeting_type)
        .bind(data.meeting_date)
        .bind(data.content)
        .bind(data.participants_count)
        .bind(data.photo_url)
        .fetch_one(pool)
        .await?;

        Ok(report)
    }

    /// Finds a report by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let report = sqlx::query_as::<_, MeetingReport>(
            r#"
            SELECT id, discipler_id, title, meeting_type, meeting_date, content,
                   participants_count, photo_url, created_at, updated_at
            FROM meeting_reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(report)
    }

    /// Lists a discipler's reports, newest meeting first
    pub async fn list_by_discipler(
        pool: &PgPool,
        discipler_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let reports = sqlx::query_as::<_, MeetingReport>(
            r#"
            SELECT id, discipler_id, title, meeting_type, meeting_date, content,
                   participants_count, photo_url, created_at, updated_at
            FROM meeting_reports
            WHERE discipler_id = $1
            ORDER BY meeting_date DESC, created_at DESC
            "#,
        )
        .bind(discipler_id)
        .fetch_all(pool)
        .await?;

        Ok(reports)
    }
}

/// Meeting attendance model and database operations
///
/// One row per (meeting, disciple) pair holding the presence flag for the
/// group's attendance checklist. Marking attendance is an upsert so the
/// checklist can be toggled repeatedly without a read-then-write race.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE meeting_attendance (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     group_meeting_id UUID NOT NULL REFERENCES group_meetings(id) ON DELETE CASCADE,
///     disciple_id UUID NOT NULL REFERENCES profiles(id),
///     present BOOLEAN NOT NULL DEFAULT FALSE,
///     notes TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (group_meeting_id, disciple_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// An attendance record for one disciple at one group meeting
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    /// Unique attendance row ID
    pub id: Uuid,

    /// Meeting the record belongs to
    pub group_meeting_id: Uuid,

    /// Disciple whose presence is tracked
    pub disciple_id: Uuid,

    /// Whether the disciple was present
    pub present: bool,

    /// Optional per-disciple notes for the session
    pub notes: Option<String>,

    /// When the record was first created
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    /// Marks a disciple present or absent for a meeting
    ///
    /// Upserts on (meeting, disciple): an existing record is updated in
    /// place, otherwise a new one is inserted. This matches the checklist
    /// UX where presence is toggled back and forth.
    pub async fn mark(
        pool: &PgPool,
        group_meeting_id: Uuid,
        disciple_id: Uuid,
        present: bool,
        notes: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO meeting_attendance (group_meeting_id, disciple_id, present, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (group_meeting_id, disciple_id)
            DO UPDATE SET present = EXCLUDED.present,
                          notes = COALESCE(EXCLUDED.notes, meeting_attendance.notes)
            RETURNING id, group_meeting_id, disciple_id, present, notes, created_at
            "#,
        )
        .bind(group_meeting_id)
        .bind(disciple_id)
        .bind(present)
        .bind(notes)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Lists attendance records for a meeting
    pub async fn list_by_meeting(
        pool: &PgPool,
        group_meeting_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, group_meeting_id, disciple_id, present, notes, created_at
            FROM meeting_attendance
            WHERE group_meeting_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(group_meeting_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Counts disciples marked present for a meeting
    pub async fn count_present(
        pool: &PgPool,
        group_meeting_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM meeting_attendance WHERE group_meeting_id = $1 AND present",
        )
        .bind(group_meeting_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

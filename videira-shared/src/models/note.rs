/// Discipleship note model and database operations
///
/// One-on-one meeting notes a discipler keeps per disciple: the main
/// content plus optional observations and prayer requests. Notes are
/// never hard-deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE discipleship_notes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     disciple_id UUID NOT NULL REFERENCES profiles(id),
///     discipler_id UUID NOT NULL REFERENCES profiles(id),
///     content TEXT NOT NULL,
///     observations TEXT,
///     prayer_requests TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single discipleship note
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    /// Unique note ID
    pub id: Uuid,

    /// Disciple this note is about
    pub disciple_id: Uuid,

    /// Discipler who wrote the note
    pub discipler_id: Uuid,

    /// Main note content
    pub content: String,

    /// Free-form observations
    pub observations: Option<String>,

    /// Prayer requests captured during the meeting
    pub prayer_requests: Option<String>,

    /// When the note was created
    pub created_at: DateTime<Utc>,

    /// When the note was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    /// Disciple the note is about
    pub disciple_id: Uuid,

    /// Authoring discipler
    pub discipler_id: Uuid,

    /// Main note content
    pub content: String,

    /// Free-form observations
    pub observations: Option<String>,

    /// Prayer requests
    pub prayer_requests: Option<String>,
}

/// Input for updating an existing note
///
/// Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNote {
    /// New content
    pub content: Option<String>,

    /// New observations (use Some(None) to clear)
    pub observations: Option<Option<String>>,

    /// New prayer requests (use Some(None) to clear)
    pub prayer_requests: Option<Option<String>>,
}

impl Note {
    /// Creates a new note
    pub async fn create(pool: &PgPool, data: CreateNote) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO discipleship_notes (disciple_id, discipler_id, content, observations, prayer_requests)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, disciple_id, discipler_id, content, observations, prayer_requests,
                      created_at, updated_at
            "#,
        )
        .bind(data.disciple_id)
        .bind(data.discipler_id)
        .bind(data.content)
        .bind(data.observations)
        .bind(data.prayer_requests)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// Finds a note by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, disciple_id, discipler_id, content, observations, prayer_requests,
                   created_at, updated_at
            FROM discipleship_notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Lists notes for a disciple, newest first
    pub async fn list_by_disciple(
        pool: &PgPool,
        disciple_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, disciple_id, discipler_id, content, observations, prayer_requests,
                   created_at, updated_at
            FROM discipleship_notes
            WHERE disciple_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(disciple_id)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }

    /// Updates an existing note
    ///
    /// Only non-None fields are changed; `updated_at` is bumped.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateNote,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE discipleship_notes SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }
        if data.observations.is_some() {
            bind_count += 1;
            query.push_str(&format!(", observations = ${}", bind_count));
        }
        if data.prayer_requests.is_some() {
            bind_count += 1;
            query.push_str(&format!(", prayer_requests = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, disciple_id, discipler_id, content, observations, \
             prayer_requests, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Note>(&query).bind(id);

        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(observations_opt) = data.observations {
            q = q.bind(observations_opt);
        }
        if let Some(prayer_opt) = data.prayer_requests {
            q = q.bind(prayer_opt);
        }

        let note = q.fetch_optional(pool).await?;

        Ok(note)
    }
}

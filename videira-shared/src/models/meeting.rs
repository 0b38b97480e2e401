/// Group meeting model and database operations
///
/// A group meeting is a recurring discipleship group owned by one
/// discipler. Membership is a many-to-many link to disciple profiles;
/// per-session attendance lives in the `attendance` model.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE group_meetings (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     discipler_id UUID NOT NULL REFERENCES profiles(id),
///     name VARCHAR(255) NOT NULL,
///     theme VARCHAR(255),
///     description TEXT,
///     meeting_date TIMESTAMPTZ,
///     duration INTEGER,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE group_members (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     group_meeting_id UUID NOT NULL REFERENCES group_meetings(id) ON DELETE CASCADE,
///     disciple_id UUID NOT NULL REFERENCES profiles(id),
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (group_meeting_id, disciple_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A discipleship group meeting
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupMeeting {
    /// Unique meeting ID
    pub id: Uuid,

    /// Owning discipler's profile
    pub discipler_id: Uuid,

    /// Group name
    pub name: String,

    /// Current theme
    pub theme: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Scheduled date/time of the next session
    pub meeting_date: Option<DateTime<Utc>>,

    /// Duration in minutes
    pub duration: Option<i32>,

    /// When the meeting was created
    pub created_at: DateTime<Utc>,

    /// When the meeting was last updated
    pub updated_at: DateTime<Utc>,
}

/// A disciple's membership in a group meeting
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupMember {
    /// Unique membership row ID
    pub id: Uuid,

    /// Meeting the disciple belongs to
    pub group_meeting_id: Uuid,

    /// Member's profile
    pub disciple_id: Uuid,

    /// When the disciple joined the group
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a group meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupMeeting {
    /// Owning discipler's profile
    pub discipler_id: Uuid,

    /// Group name
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

/// Input for updating a group meeting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroupMeeting {
    /// New group name
    pub name: Option<String>,

    /// New theme (use Some(None) to clear)
    pub theme: Option<Option<String>>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New scheduled date (use Some(None) to clear)
    pub meeting_date: Option<Option<DateTime<Utc>>>,

    /// New duration (use Some(None) to clear)
    pub duration: Option<Option<i32>>,
}

impl GroupMeeting {
    /// Creates a new group meeting
    pub async fn create(pool: &PgPool, data: CreateGroupMeeting) -> Result<Self, sqlx::Error> {
        let meeting = sqlx::query_as::<_, GroupMeeting>(
            r#"
            INSERT INTO group_meetings (discipler_id, name, theme, description, meeting_date, duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, discipler_id, name, theme, description, meeting_date, duration,
                      created_at, updated_at
            "#,
        )
        .bind(data.discipler_id)
        .bind(data.name)
        .bind(data.theme)
        .bind(data.description)
        .bind(data.meeting_date)
        .bind(data.duration)
        .fetch_one(pool)
        .await?;

        Ok(meeting)
    }

    /// Finds a meeting by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let meeting = sqlx::query_as::<_, GroupMeeting>(
            r#"
            SELECT id, discipler_id, name, theme, description, meeting_date, duration,
                   created_at, updated_at
            FROM group_meetings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(meeting)
    }

    /// Lists meetings owned by a discipler, newest first
    pub async fn list_by_discipler(
        pool: &PgPool,
        discipler_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let meetings = sqlx::query_as::<_, GroupMeeting>(
            r#"
            SELECT id, discipler_id, name, theme, description, meeting_date, duration,
                   created_at, updated_at
            FROM group_meetings
            WHERE discipler_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(discipler_id)
        .fetch_all(pool)
        .await?;

        Ok(meetings)
    }

    /// Updates a group meeting
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateGroupMeeting,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE group_meetings SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.theme.is_some() {
            bind_count += 1;
            query.push_str(&format!(", theme = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.meeting_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", meeting_date = ${}", bind_count));
        }
        if data.duration.is_some() {
            bind_count += 1;
            query.push_str(&format!(", duration = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, discipler_id, name, theme, description, meeting_date, \
             duration, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, GroupMeeting>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(theme_opt) = data.theme {
            q = q.bind(theme_opt);
        }
        if let Some(description_opt) = data.description {
            q = q.bind(description_opt);
        }
        if let Some(date_opt) = data.meeting_date {
            q = q.bind(date_opt);
        }
        if let Some(duration_opt) = data.duration {
            q = q.bind(duration_opt);
        }

        let meeting = q.fetch_optional(pool).await?;

        Ok(meeting)
    }
}

impl GroupMember {
    /// Adds a disciple to a group meeting
    ///
    /// # Errors
    ///
    /// Returns an error if the disciple is already a member (unique
    /// constraint violation) or either reference is missing.
    pub async fn add(
        pool: &PgPool,
        group_meeting_id: Uuid,
        disciple_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            INSERT INTO group_members (group_meeting_id, disciple_id)
            VALUES ($1, $2)
            RETURNING id, group_meeting_id, disciple_id, joined_at
            "#,
        )
        .bind(group_meeting_id)
        .bind(disciple_id)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Lists the members of a group meeting
    pub async fn list_by_meeting(
        pool: &PgPool,
        group_meeting_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT id, group_meeting_id, disciple_id, joined_at
            FROM group_members
            WHERE group_meeting_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(group_meeting_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Checks whether a disciple is on a meeting's roster
    pub async fn is_member(
        pool: &PgPool,
        group_meeting_id: Uuid,
        disciple_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM group_members
                WHERE group_meeting_id = $1 AND disciple_id = $2
            )
            "#,
        )
        .bind(group_meeting_id)
        .bind(disciple_id)
        .fetch_one(pool)
        .await?;

        Ok(row.0)
    }

    /// Removes a disciple from a group meeting
    ///
    /// Returns true if a membership row was deleted.
    pub async fn remove(
        pool: &PgPool,
        group_meeting_id: Uuid,
        disciple_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM group_members WHERE group_meeting_id = $1 AND disciple_id = $2",
        )
        .bind(group_meeting_id)
        .bind(disciple_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_group_meeting_default() {
        let update = UpdateGroupMeeting::default();
        assert!(update.name.is_none());
        assert!(update.theme.is_none());
        assert!(update.description.is_none());
        assert!(update.meeting_date.is_none());
        assert!(update.duration.is_none());
    }
}

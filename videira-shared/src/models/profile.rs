/// Profile model and database operations
///
/// A profile is the application-level person record, distinct from the
/// bare credential identity in `users`. Disciplers can register disciples
/// who have no login yet, so `user_id` is nullable; conversely a freshly
/// registered user may briefly have no profile row, which is a valid
/// state and never an error.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE profile_role AS ENUM ('disciple', 'discipler', 'master');
///
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID UNIQUE REFERENCES users(id) ON DELETE SET NULL,
///     name VARCHAR(255) NOT NULL,
///     email CITEXT,
///     phone VARCHAR(32),
///     role profile_role NOT NULL DEFAULT 'disciple',
///     discipler_id UUID REFERENCES profiles(id),
///     spiritual_stage VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Invariant
///
/// `discipler_id`, when set, must reference a profile whose role is
/// discipler or master. `assign_discipler` enforces this; plain `update`
/// cannot touch the field.
///
/// # Example
///
/// ```no_run
/// use videira_shared::models::profile::{Profile, CreateProfile, Role};
/// use videira_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let profile = Profile::create(&pool, CreateProfile {
///     user_id: Some(Uuid::new_v4()),
///     name: "Maria Silva".to_string(),
///     email: Some("maria@example.com".to_string()),
///     phone: None,
///     role: Role::Disciple,
///     discipler_id: None,
///     spiritual_stage: Some("Novo Convertido".to_string()),
/// }).await?;
///
/// // Zero-or-one lookup: absence is not an error
/// let found = Profile::find_by_user_id(&pool, profile.user_id.unwrap()).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Closed set of application roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "profile_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A person being discipled; sees their own content only
    Disciple,

    /// Manages a set of assigned disciples, meetings, and reports
    Discipler,

    /// Highest privilege: reassigns disciplers and promotes users
    Master,
}

impl Role {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Disciple => "disciple",
            Role::Discipler => "discipler",
            Role::Master => "master",
        }
    }

    /// Checks if this role meets the required role's minimum
    ///
    /// Roles are hierarchical: master ⊇ discipler ⊇ disciple. A master
    /// satisfies every requirement; a discipler satisfies discipler and
    /// disciple requirements.
    pub fn satisfies(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// May this role hold a roster of assigned disciples?
    pub fn can_disciple(&self) -> bool {
        matches!(self, Role::Discipler | Role::Master)
    }

    /// Returns numeric permission level for comparison
    fn level(&self) -> u8 {
        match self {
            Role::Master => 3,
            Role::Discipler => 2,
            Role::Disciple => 1,
        }
    }
}

/// Profile model representing a person in the discipleship network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// Unique profile ID (UUID v4)
    pub id: Uuid,

    /// Credential identity this profile belongs to
    ///
    /// None for disciples registered by their discipler without a login
    pub user_id: Option<Uuid>,

    /// Display name
    pub name: String,

    /// Contact email (informational; the login email lives on `users`)
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Application role
    pub role: Role,

    /// Back-reference to the assigning discipler's profile
    pub discipler_id: Option<Uuid>,

    /// Spiritual-stage label (e.g., "Novo Convertido")
    pub spiritual_stage: Option<String>,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    /// Credential identity, if the person has one
    pub user_id: Option<Uuid>,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Application role (defaults to Disciple)
    #[serde(default = "default_role")]
    pub role: Role,

    /// Assigning discipler, validated against the role invariant
    pub discipler_id: Option<Uuid>,

    /// Spiritual-stage label
    pub spiritual_stage: Option<String>,
}

fn default_role() -> Role {
    Role::Disciple
}

/// Input for updating an existing profile
///
/// All fields are optional. Only non-None fields will be updated.
/// Role and discipler linkage have dedicated operations and cannot be
/// changed through a plain update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New display name
    pub name: Option<String>,

    /// New contact email (use Some(None) to clear)
    pub email: Option<Option<String>>,

    /// New contact phone (use Some(None) to clear)
    pub phone: Option<Option<String>>,

    /// New spiritual-stage label (use Some(None) to clear)
    pub spiritual_stage: Option<Option<String>>,
}

impl Profile {
    /// Creates a new profile in the database
    ///
    /// If `discipler_id` is set, the referenced profile must exist and
    /// hold the discipler or master role.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The discipler reference violates the role invariant
    /// - `user_id` already has a profile (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProfile) -> Result<Self, sqlx::Error> {
        if let Some(discipler_id) = data.discipler_id {
            check_discipler_role(pool, discipler_id).await?;
        }

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, name, email, phone, role, discipler_id, spiritual_stage)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.role)
        .bind(data.discipler_id)
        .bind(data.spiritual_stage)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds a profile by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Finds the profile belonging to a credential identity
    ///
    /// Zero-or-one semantics: a missing row is `Ok(None)`, not an error.
    /// New identities legitimately lack a profile until one is created.
    pub async fn find_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                   created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Lists all profiles, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                   created_at, updated_at
            FROM profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Lists the disciples assigned to a discipler
    pub async fn list_by_discipler(
        pool: &PgPool,
        discipler_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                   created_at, updated_at
            FROM profiles
            WHERE discipler_id = $1
            ORDER BY name
            "#,
        )
        .bind(discipler_id)
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Lists all profiles holding a given role
    pub async fn list_by_role(pool: &PgPool, role: Role) -> Result<Vec<Self>, sqlx::Error> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                   created_at, updated_at
            FROM profiles
            WHERE role = $1
            ORDER BY name
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Assigns (or clears) the discipler for a profile
    ///
    /// Enforces the invariant that the target must hold the discipler or
    /// master role. Passing None clears the assignment.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::RowNotFound` if the discipler reference does
    /// not exist or holds the disciple role.
    pub async fn assign_discipler(
        pool: &PgPool,
        id: Uuid,
        discipler_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        if let Some(discipler_id) = discipler_id {
            check_discipler_role(pool, discipler_id).await?;
        }

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET discipler_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(discipler_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Changes a profile's role
    ///
    /// Demoting a profile to disciple clears any disciples still pointing
    /// at it, keeping every remaining discipler reference valid.
    pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if role == Role::Disciple {
            sqlx::query("UPDATE profiles SET discipler_id = NULL, updated_at = NOW() WHERE discipler_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, email, phone, role, discipler_id, spiritual_stage,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(profile)
    }

    /// Updates an existing profile's editable fields
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE profiles SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.spiritual_stage.is_some() {
            bind_count += 1;
            query.push_str(&format!(", spiritual_stage = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, user_id, name, email, phone, role, discipler_id, \
             spiritual_stage, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Profile>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email_opt) = data.email {
            q = q.bind(email_opt);
        }
        if let Some(phone_opt) = data.phone {
            q = q.bind(phone_opt);
        }
        if let Some(stage_opt) = data.spiritual_stage {
            q = q.bind(stage_opt);
        }

        let profile = q.fetch_optional(pool).await?;

        Ok(profile)
    }
}

/// Verifies that a profile exists and may act as a discipler
///
/// Returns `sqlx::Error::RowNotFound` otherwise, which the API layer maps
/// to a client error.
async fn check_discipler_role(pool: &PgPool, discipler_id: Uuid) -> Result<(), sqlx::Error> {
    let row: Option<(Role,)> = sqlx::query_as("SELECT role FROM profiles WHERE id = $1")
        .bind(discipler_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some((role,)) if role.can_disciple() => Ok(()),
        _ => Err(sqlx::Error::RowNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        // master ⊇ discipler ⊇ disciple
        assert!(Role::Master.satisfies(Role::Master));
        assert!(Role::Master.satisfies(Role::Discipler));
        assert!(Role::Master.satisfies(Role::Disciple));

        assert!(!Role::Discipler.satisfies(Role::Master));
        assert!(Role::Discipler.satisfies(Role::Discipler));
        assert!(Role::Discipler.satisfies(Role::Disciple));

        assert!(!Role::Disciple.satisfies(Role::Master));
        assert!(!Role::Disciple.satisfies(Role::Discipler));
        assert!(Role::Disciple.satisfies(Role::Disciple));
    }

    #[test]
    fn test_can_disciple() {
        assert!(!Role::Disciple.can_disciple());
        assert!(Role::Discipler.can_disciple());
        assert!(Role::Master.can_disciple());
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Disciple.as_str(), "disciple");
        assert_eq!(Role::Discipler.as_str(), "discipler");
        assert_eq!(Role::Master.as_str(), "master");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Discipler).unwrap();
        assert_eq!(json, "\"discipler\"");

        let role: Role = serde_json::from_str("\"master\"").unwrap();
        assert_eq!(role, Role::Master);
    }

    #[test]
    fn test_profile_equality_is_structural() {
        let now = chrono::Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            name: "Ana".to_string(),
            email: None,
            phone: None,
            role: Role::Disciple,
            discipler_id: None,
            spiritual_stage: None,
            created_at: now,
            updated_at: now,
        };

        // Session states compare whole profiles, so equality has to be
        // field-by-field
        assert_eq!(profile, profile.clone());

        let mut promoted = profile.clone();
        promoted.role = Role::Discipler;
        assert_ne!(profile, promoted);
    }

    #[test]
    fn test_update_profile_default() {
        let update = UpdateProfile::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.phone.is_none());
        assert!(update.spiritual_stage.is_none());
    }
}

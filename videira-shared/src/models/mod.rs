/// Database models for Videira
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Credential identities (email + password hash)
/// - `profile`: Application person records with roles and discipler linkage
/// - `note`: One-on-one discipleship notes
/// - `meeting`: Group meetings and their membership
/// - `attendance`: Per-meeting attendance checklist
/// - `report`: Free-text meeting reports
/// - `one_time_token`: Single-use tokens for password reset and email confirmation
///
/// # Example
///
/// ```no_run
/// use videira_shared::models::user::{User, CreateUser};
/// use videira_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("João Silva".to_string()),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod attendance;
pub mod meeting;
pub mod note;
pub mod one_time_token;
pub mod profile;
pub mod report;
pub mod user;

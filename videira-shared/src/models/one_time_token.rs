/// Single-use token model and database operations
///
/// Tokens are generated by `auth::secure_token`, stored only as a
/// SHA-256 hash, expire after a purpose-specific window, and can be
/// consumed exactly once. The plaintext token is returned a single time
/// at issue for out-of-band delivery.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE one_time_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     purpose VARCHAR(32) NOT NULL,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     used_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::secure_token;

/// What a single-use token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Password reset (short-lived)
    PasswordReset,

    /// Email address confirmation after registration
    EmailVerify,
}

impl TokenPurpose {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::EmailVerify => "email_verify",
        }
    }

    /// How long a token of this purpose stays valid
    pub fn ttl(&self) -> Duration {
        match self {
            TokenPurpose::PasswordReset => Duration::hours(2),
            TokenPurpose::EmailVerify => Duration::hours(48),
        }
    }
}

/// A single-use token row (token stored as hash only)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OneTimeToken {
    /// Unique row ID
    pub id: Uuid,

    /// User the token belongs to
    pub user_id: Uuid,

    /// Purpose label ("password_reset" or "email_verify")
    pub purpose: String,

    /// SHA-256 hex hash of the issued token
    pub token_hash: String,

    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,

    /// When the token was consumed (None if still unused)
    pub used_at: Option<DateTime<Utc>>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl OneTimeToken {
    /// Issues a new token for a user
    ///
    /// Returns the row plus the plaintext token. The plaintext exists
    /// only in this return value; storage keeps the hash.
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<(Self, String), sqlx::Error> {
        let (token, token_hash) = secure_token::generate_token();
        let expires_at = Utc::now() + purpose.ttl();

        let row = sqlx::query_as::<_, OneTimeToken>(
            r#"
            INSERT INTO one_time_tokens (user_id, purpose, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, purpose, token_hash, expires_at, used_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok((row, token))
    }

    /// Consumes a token
    ///
    /// Looks the token up by hash and atomically marks it used. Returns
    /// the owning user's ID, or None if the token is unknown, of another
    /// purpose, expired, or already consumed.
    ///
    /// Takes any executor so callers can pair consumption with the write
    /// it authorizes inside one transaction.
    pub async fn consume<'e, E>(
        executor: E,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<Uuid>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        if !secure_token::validate_token_format(token) {
            return Ok(None);
        }

        let token_hash = secure_token::hash_token(token);

        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE one_time_tokens
            SET used_at = NOW()
            WHERE token_hash = $1
              AND purpose = $2
              AND used_at IS NULL
              AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .bind(purpose.as_str())
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|(user_id,)| user_id))
    }

    /// Whether this token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether this token has already been consumed
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

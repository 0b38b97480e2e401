/// Authentication and authorization utilities
///
/// This module provides secure authentication primitives for Videira:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT token generation and validation
/// - [`secure_token`]: Single-use token generation and hashing
/// - [`middleware`]: Request authentication yielding a [`middleware::AuthContext`]
/// - [`authorization`]: Role-hierarchy checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Single-Use Tokens**: Secure random generation with SHA-256 hashing
///
/// # Example
///
/// ```no_run
/// use videira_shared::auth::password::{hash_password, verify_password};
/// use videira_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod secure_token;

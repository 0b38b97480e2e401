//! # Videira Shared Library
//!
//! This crate contains shared types, models, and auth logic used by the
//! Videira API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pooling and migrations
//! - `session`: Session/profile state machine and auth-event tracker

pub mod auth;
pub mod db;
pub mod models;
pub mod session;

/// Current version of the Videira shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

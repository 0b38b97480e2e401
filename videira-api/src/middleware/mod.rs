/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Role-based access guard
/// - Security headers

pub mod guard;
pub mod security;

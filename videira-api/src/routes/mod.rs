/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout, reset)
/// - `profiles`: Own profile and master administration
/// - `disciples`: Disciple roster and discipleship notes
/// - `meetings`: Group meetings, members, attendance
/// - `reports`: Meeting reports
/// - `devotional`: Daily devotional content

pub mod auth;
pub mod devotional;
pub mod disciples;
pub mod health;
pub mod meetings;
pub mod profiles;
pub mod reports;

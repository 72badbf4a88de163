/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, Google, verification)
/// - `users`: Profile, moderation, and search endpoints
/// - `organizers`: Organizer lifecycle endpoints
/// - `members`: Organizer membership endpoints

pub mod auth;
pub mod health;
pub mod members;
pub mod organizers;
pub mod users;

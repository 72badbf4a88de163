//! # Eventra Shared Library
//!
//! Shared types and business logic for the Eventra ticketing platform,
//! used by the API server.
//!
//! ## Module Organization
//!
//! - `models`: database models and CRUD operations
//! - `auth`: credential codec, token issuing, membership guards
//! - `db`: connection pooling and migrations
//! - `slug`: URL slug derivation

pub mod auth;
pub mod db;
pub mod models;
pub mod slug;

/// Current version of the Eventra shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

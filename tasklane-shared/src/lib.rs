//! # TaskLane Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the TaskLane API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Access-controlled task and grant operations
//! - `auth`: Authentication utilities (passwords, tokens, principals)
//! - `db`: Connection pool and migration management

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TaskLane shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

//! # Taskpad Shared Library
//!
//! This crate contains the data layer and authentication primitives used by
//! the Taskpad web server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models (`User`, `Task`, `Session`) and their queries
//! - `auth`: Password hashing, session tokens, and the credential store

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskpad shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

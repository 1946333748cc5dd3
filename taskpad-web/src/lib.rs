//! # Taskpad Web Server Library
//!
//! Server-rendered, multi-user to-do list.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error type and its mapping to flash-and-redirect responses
//! - `forms`: Form input structs and their validation
//! - `middleware`: Security headers
//! - `routes`: Route handlers
//! - `session`: Session middleware, `Session` handle, and the login guard
//! - `views`: Embedded Tera templates

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod views;

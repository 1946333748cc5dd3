/// Route handlers
///
/// - `tasks`: List, create, edit, and delete the caller's todos
/// - `auth`: Register, log in, log out
/// - `pages`: Static pages
/// - `health`: Health check endpoint

pub mod auth;
pub mod health;
pub mod pages;
pub mod tasks;

/// Middleware modules for the web server
///
/// Session handling lives in [`crate::session`]; this module only holds
/// response hardening.

pub mod security;

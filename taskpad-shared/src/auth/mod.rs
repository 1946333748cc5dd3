/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session_token`]: Random session tokens and HMAC-signed cookie values
/// - [`credentials`]: Registration and login checks against the `user` table
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::auth::credentials::authenticate;
/// use taskpad_shared::auth::session_token::{generate_token, hash_token, sign_token};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, secret: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let user = authenticate(&pool, "alice", "pw1").await?;
///
/// let token = generate_token();
/// let stored_id = hash_token(&token);
/// let cookie_value = sign_token(&token, secret);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod password;
pub mod session_token;

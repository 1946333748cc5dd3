/// Credential store: registration and login checks
///
/// Usernames are unique. Registration pre-checks for an existing username and
/// also maps the table's UNIQUE constraint to `DuplicateUsername`, so two
/// concurrent registrations for the same name cannot both succeed.
///
/// Argon2 work runs on tokio's blocking pool.
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::auth::credentials::{authenticate, register};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = register(&pool, "alice", "pw1").await?;
/// let same = authenticate(&pool, "alice", "pw1").await?;
/// assert_eq!(user.id, same.id);
/// # Ok(())
/// # }
/// ```

use std::sync::OnceLock;

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::password::{self, PasswordError};
use crate::models::user::{CreateUser, User};

/// Errors from the credential store
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Username already registered
    #[error("username already exists")]
    DuplicateUsername,

    /// Unknown username or wrong password
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Registers a new account
///
/// `username` and `password` are expected to be trimmed and non-empty.
///
/// # Errors
///
/// - `DuplicateUsername` if the name is taken
/// - `Password` / `Database` for infrastructure failures
pub async fn register(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, CredentialError> {
    if User::find_by_username(pool, username).await?.is_some() {
        debug!(username, "Registration rejected: username taken");
        return Err(CredentialError::DuplicateUsername);
    }

    let password_hash = hash_blocking(password.to_string()).await?;

    let user = User::create(
        pool,
        CreateUser {
            username: username.to_string(),
            password_hash,
        },
    )
    .await
    .map_err(|err| match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => CredentialError::DuplicateUsername,
        _ => CredentialError::Database(err),
    })?;

    info!(user_id = user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Verifies a username/password pair and returns the matching user
///
/// An unknown username still pays for one Argon2 verification so that the
/// response time does not reveal which usernames exist.
///
/// # Errors
///
/// - `InvalidCredentials` if the user is unknown or the password is wrong
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, CredentialError> {
    let Some(user) = User::find_by_username(pool, username).await? else {
        verify_dummy_blocking(password.to_string()).await;
        debug!(username, "Login rejected: unknown username");
        return Err(CredentialError::InvalidCredentials);
    };

    if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
        debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(CredentialError::InvalidCredentials);
    }

    Ok(user)
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| password::hash_password("taskpad-dummy-password").ok())
        .as_deref()
}

/// Burns one verification against the dummy hash, building it on first use
async fn verify_dummy_blocking(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(dummy) = dummy_hash() {
            let _ = password::verify_password(&password, dummy);
        }
    })
    .await;
}

async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}

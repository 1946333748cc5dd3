/// Configuration management for the web server
///
/// Configuration is read from environment variables, with a `.env` file
/// loaded first when present.
///
/// # Environment Variables
///
/// - `APP_HOST`: Host to bind to (default: 0.0.0.0)
/// - `APP_PORT`: Port to bind to (default: 8000)
/// - `APP_PRODUCTION`: `true` enables `Secure` cookies and HSTS (default: false)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://todo.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Key for signing session cookies (required, 32+ chars)
/// - `SESSION_TTL_SECONDS`: Session lifetime from login or first flash
///   (default: 1209600, two weeks)
/// - `RUST_LOG`: Log filter (default: taskpad_web=debug,taskpad_shared=info,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskpad_web::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use taskpad_shared::db::pool::DatabaseConfig;

/// Minimum accepted length of `SESSION_SECRET`
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Default session lifetime in seconds
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub session: SessionConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (served over HTTPS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret key for signing session cookies
    ///
    /// Must be unique per deployment. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Lifetime of a session row and its cookie
    pub ttl_seconds: i64,
}

impl SessionConfig {
    /// Session lifetime as a duration
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_seconds)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET` is missing or too short, or if a
    /// numeric/boolean variable cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("APP_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("APP_PORT is not a valid port: {}", e))?;
        let production = lookup("APP_PRODUCTION")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(false);

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://todo.db".to_string());
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is not a number: {}", e))?;

        let secret = lookup("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        if secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LEN
            );
        }

        let ttl_seconds = match lookup("SESSION_TTL_SECONDS") {
            Some(value) => value
                .parse::<i64>()
                .map_err(|e| anyhow::anyhow!("SESSION_TTL_SECONDS is not a number: {}", e))?,
            None => DEFAULT_SESSION_TTL_SECONDS,
        };

        if ttl_seconds <= 0 {
            anyhow::bail!("SESSION_TTL_SECONDS must be positive");
        }

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                production,
            },
            database: DatabaseSettings {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                ttl_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pool settings derived from this configuration
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("SESSION_SECRET", SECRET)])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert!(!config.server.production);
        assert_eq!(config.database.url, "sqlite://todo.db");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.pool_config().url, "sqlite://todo.db");
        assert_eq!(config.session.ttl(), chrono::Duration::days(14));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", SECRET),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9000"),
            ("APP_PRODUCTION", "true"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert!(config.server.production);
        assert_eq!(config.pool_config().max_connections, 3);
    }

    #[test]
    fn test_secret_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SESSION_SECRET", "short")])).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_bad_port_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", SECRET),
            ("APP_PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_ttl() {
        let config = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", SECRET),
            ("SESSION_TTL_SECONDS", "3600"),
        ]))
        .unwrap();
        assert_eq!(config.session.ttl(), chrono::Duration::hours(1));

        let result = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", SECRET),
            ("SESSION_TTL_SECONDS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = Config::from_lookup(lookup_from(&[("SESSION_SECRET", SECRET)])).unwrap();
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}

/// Server-side session records
///
/// The browser only ever holds a signed random token; everything the server
/// remembers about a visitor (who is logged in, which flash messages are
/// pending) lives in this table, keyed by the SHA-256 of that token.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE session (
///     id CHAR(64) PRIMARY KEY,
///     user_id INTEGER REFERENCES user(id) ON DELETE CASCADE,
///     flashes TEXT NOT NULL DEFAULT '[]',
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
///
/// Sessions live for a fixed time from creation. Callers decide the lifetime
/// and pass a cutoff; rows created before it are treated as gone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, SqlitePool};

/// Stored session state
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionRecord {
    /// SHA-256 hex digest of the session token
    pub id: String,

    /// Authenticated user, if any
    pub user_id: Option<i64>,

    /// Flash messages queued for the next rendered page
    pub flashes: Json<Vec<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Inserts a new session row
    pub async fn create(
        pool: &SqlitePool,
        id: &str,
        user_id: Option<i64>,
        flashes: &[String],
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO session (id, user_id, flashes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, flashes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Json(flashes))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Loads a session by its token hash
    pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, flashes, created_at, updated_at
            FROM session
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Overwrites the identity and pending flashes of a session
    ///
    /// Returns false if the row no longer exists.
    pub async fn save(
        pool: &SqlitePool,
        id: &str,
        user_id: Option<i64>,
        flashes: &[String],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE session
            SET user_id = ?, flashes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .bind(Json(flashes))
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether this session was created before `cutoff`
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at < cutoff
    }

    /// Deletes every session created before `cutoff`, returning how many
    pub async fn delete_expired(
        pool: &SqlitePool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session WHERE created_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Removes a session row
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    };

    #[tokio::test]
    async fn test_session_lifecycle() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let created = SessionRecord::create(&pool, "abc", None, &["hello".to_string()])
            .await
            .unwrap();
        assert!(created.user_id.is_none());
        assert_eq!(created.flashes.0, vec!["hello".to_string()]);

        assert!(SessionRecord::save(&pool, "abc", None, &[]).await.unwrap());
        let loaded = SessionRecord::find(&pool, "abc").await.unwrap().unwrap();
        assert!(loaded.flashes.0.is_empty());

        assert!(SessionRecord::delete(&pool, "abc").await.unwrap());
        assert!(SessionRecord::find(&pool, "abc").await.unwrap().is_none());
        assert!(!SessionRecord::save(&pool, "abc", None, &[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_recent_rows() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        SessionRecord::create(&pool, "old", None, &["stale".to_string()])
            .await
            .unwrap();
        sqlx::query("UPDATE session SET created_at = ? WHERE id = 'old'")
            .bind(Utc::now() - Duration::days(30))
            .execute(&pool)
            .await
            .unwrap();
        SessionRecord::create(&pool, "new", None, &["fresh".to_string()])
            .await
            .unwrap();

        let cutoff = Utc::now() - Duration::days(14);
        let old = SessionRecord::find(&pool, "old").await.unwrap().unwrap();
        assert!(old.is_expired(cutoff));

        assert_eq!(SessionRecord::delete_expired(&pool, cutoff).await.unwrap(), 1);
        assert!(SessionRecord::find(&pool, "old").await.unwrap().is_none());

        let new = SessionRecord::find(&pool, "new").await.unwrap().unwrap();
        assert!(!new.is_expired(cutoff));
    }
}

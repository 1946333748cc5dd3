/// Task model and database operations
///
/// Every query in this module that reads or mutates a single task filters on
/// both `id` and `owner_id`, so a caller can never see or touch a task owned
/// by another user. A miss is reported as `None` / `false`; mapping that to a
/// user-facing "not found" is the caller's job.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todo (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(500) NOT NULL,
///     created_at TEXT NOT NULL,
///     owner_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A to-do item belonging to exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Auto-assigned task ID
    pub id: i64,

    /// Short title (never empty)
    pub title: String,

    /// Free-form description (never empty)
    pub description: String,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Owning user
    pub owner_id: i64,
}

/// Input for creating a task
///
/// Title and description must already be trimmed and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
}

/// Input for editing a task in place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: String,
}

impl Task {
    /// Inserts a new task stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if `owner_id` does not reference an
    /// existing user.
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO todo (title, description, created_at, owner_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, description, created_at, owner_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(Utc::now())
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, only if it belongs to `owner_id`
    pub async fn find_by_id_and_owner(
        pool: &SqlitePool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, created_at, owner_id
            FROM todo
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks owned by `owner_id` in insertion order
    pub async fn list_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, created_at, owner_id
            FROM todo
            WHERE owner_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Replaces title and description of a task owned by `owner_id`
    ///
    /// `created_at` is left untouched. Returns `None` when no task matches
    /// both `id` and `owner_id`.
    pub async fn update_for_owner(
        pool: &SqlitePool,
        id: i64,
        owner_id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE todo
            SET title = ?, description = ?
            WHERE id = ? AND owner_id = ?
            RETURNING id, title, description, created_at, owner_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Permanently deletes a task owned by `owner_id`
    ///
    /// Returns false if nothing matched.
    pub async fn delete_for_owner(
        pool: &SqlitePool,
        id: i64,
        owner_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks owned by `owner_id`
    pub async fn count_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

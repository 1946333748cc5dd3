/// Database models for Taskpad
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `user`: Registered accounts
/// - `task`: To-do items, always scoped to an owning user
/// - `session`: Server-side session state behind the session cookie
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::task::{CreateTask, Task};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
/// Task::create(
///     &pool,
///     CreateTask {
///         owner_id: user_id,
///         title: "Buy milk".to_string(),
///         description: "2%".to_string(),
///     },
/// )
/// .await?;
///
/// let mine = Task::list_by_owner(&pool, user_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod session;
pub mod task;
pub mod user;

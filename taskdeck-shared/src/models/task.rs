/// Task model and visibility-scoped database operations
///
/// Tasks are owned records: every task has exactly one owner and
/// ownership is never transferred. All lookups and mutations go through
/// queries that take a [`Visibility`] and apply it as a WHERE predicate,
/// so a record outside the caller's scope is never loaded — a
/// cross-owner id behaves exactly like a nonexistent one.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('New', 'Active', 'Done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(128) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'New',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::scope::Visibility;
/// use taskdeck_shared::models::task::{CreateTask, Task, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     owner_id,
///     title: "Write the report".to_string(),
///     description: None,
///     status: TaskStatus::New,
/// }).await?;
///
/// let visible = Task::find_visible(&pool, &Visibility::OwnedBy(owner_id), task.id).await?;
/// assert!(visible.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::scope::Visibility;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Freshly created, not started
    New,

    /// In progress
    Active,

    /// Completed
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database label
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "New",
            TaskStatus::Active => "Active",
            TaskStatus::Done => "Done",
        }
    }

    /// Lenient parse used for the list status filter
    ///
    /// Unrecognized values yield `None`, which callers treat as "no
    /// filter" rather than an error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(TaskStatus::New),
            "Active" => Some(TaskStatus::Active),
            "Done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::New
    }
}

/// Task model representing an owned task record
///
/// Carries `owner_username` (joined from `users`) because the API
/// surfaces the owner by username, not id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user (immutable after creation, set by the server)
    pub owner_id: Uuid,

    /// Owner's username (joined, not stored on the task row)
    pub owner_username: String,

    /// Task title
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created (server clock, set once)
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// `owner_id` always comes from the authenticated caller; it is never
/// taken from client input.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub owner_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to `New` at the DTO layer)
    pub status: TaskStatus,
}

/// Input for updating a task
///
/// Only non-None fields are written; the owner and creation timestamp
/// are never touched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

const TASK_COLUMNS: &str = "t.id, t.owner_id, u.username AS owner_username, t.title, \
     t.description, t.status, t.created_at, t.updated_at";

impl Task {
    /// Creates a new task owned by `data.owner_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            WITH t AS (
                INSERT INTO tasks (owner_id, title, description, status)
                VALUES ($1, $2, $3, $4)
                RETURNING id, owner_id, title, description, status, created_at, updated_at
            )
            SELECT t.id, t.owner_id, u.username AS owner_username, t.title,
                   t.description, t.status, t.created_at, t.updated_at
            FROM t
            JOIN users u ON u.id = t.owner_id
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID within the caller's visibility set
    ///
    /// Returns `None` both for ids that do not exist and for ids owned by
    /// users outside the visibility set; callers cannot tell the two
    /// apart.
    pub async fn find_visible(
        pool: &PgPool,
        visibility: &Visibility,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.owner_id
            WHERE t.id = $1 AND ($2::uuid IS NULL OR t.owner_id = $2)
            "#,
        ))
        .bind(id)
        .bind(visibility.owner_filter())
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists visible tasks, newest-created first
    ///
    /// `status` narrows by equality when present; pagination is plain
    /// LIMIT/OFFSET (callers over-fetch one row to detect a next page).
    pub async fn list_visible(
        pool: &PgPool,
        visibility: &Visibility,
        status: Option<TaskStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.owner_id
            WHERE ($1::uuid IS NULL OR t.owner_id = $1)
              AND ($2::task_status IS NULL OR t.status = $2)
            ORDER BY t.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(visibility.owner_filter())
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a visible task's provided fields and refreshes `updated_at`
    ///
    /// A no-op update (all fields None) still refreshes `updated_at` and
    /// returns the current record, matching the behavior of a full-record
    /// PUT with unchanged values.
    pub async fn update_visible(
        pool: &PgPool,
        visibility: &Visibility,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Dynamic SET list; owner_id and created_at are never assignable
        let mut set_clause = String::from("updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            set_clause.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            set_clause.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            set_clause.push_str(&format!(", status = ${}", bind_count));
        }

        let query = format!(
            r#"
            WITH t AS (
                UPDATE tasks
                SET {set_clause}
                WHERE id = $1 AND ($2::uuid IS NULL OR owner_id = $2)
                RETURNING id, owner_id, title, description, status, created_at, updated_at
            )
            SELECT t.id, t.owner_id, u.username AS owner_username, t.title,
                   t.description, t.status, t.created_at, t.updated_at
            FROM t
            JOIN users u ON u.id = t.owner_id
            "#,
        );

        let mut q = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(visibility.owner_filter());

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a visible task
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if no visible task matched
    pub async fn delete_visible(
        pool: &PgPool,
        visibility: &Visibility,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM tasks WHERE id = $1 AND ($2::uuid IS NULL OR owner_id = $2)")
                .bind(id)
                .bind(visibility.owner_filter())
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Forces a visible task's status to `Done`
    ///
    /// Idempotent: completing an already-Done task succeeds and refreshes
    /// `updated_at` again.
    pub async fn complete_visible(
        pool: &PgPool,
        visibility: &Visibility,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            WITH t AS (
                UPDATE tasks
                SET status = $3, updated_at = NOW()
                WHERE id = $1 AND ($2::uuid IS NULL OR owner_id = $2)
                RETURNING id, owner_id, title, description, status, created_at, updated_at
            )
            SELECT t.id, t.owner_id, u.username AS owner_username, t.title,
                   t.description, t.status, t.created_at, t.updated_at
            FROM t
            JOIN users u ON u.id = t.owner_id
            "#,
        )
        .bind(id)
        .bind(visibility.owner_filter())
        .bind(TaskStatus::Done)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::New.as_str(), "New");
        assert_eq!(TaskStatus::Active.as_str(), "Active");
        assert_eq!(TaskStatus::Done.as_str(), "Done");
    }

    #[test]
    fn test_task_status_parse_valid() {
        assert_eq!(TaskStatus::parse("New"), Some(TaskStatus::New));
        assert_eq!(TaskStatus::parse("Active"), Some(TaskStatus::Active));
        assert_eq!(TaskStatus::parse("Done"), Some(TaskStatus::Done));
    }

    #[test]
    fn test_task_status_parse_is_lenient() {
        // Unrecognized values mean "no filter", never an error
        assert_eq!(TaskStatus::parse("Bogus"), None);
        assert_eq!(TaskStatus::parse("done"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }

    #[test]
    fn test_task_status_default() {
        assert_eq!(TaskStatus::default(), TaskStatus::New);
    }

    #[test]
    fn test_task_status_serde_labels() {
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"Done\"");
        let parsed: TaskStatus = serde_json::from_str("\"Active\"").unwrap();
        assert_eq!(parsed, TaskStatus::Active);
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let update = UpdateTask {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}

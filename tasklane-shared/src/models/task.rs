/// Task model and database operations
///
/// This module provides the Task model and its raw queries, including the
/// visibility-scoped variants the store layer builds on. A task is visible
/// to its owner and to every user holding a sharing grant for it; only the
/// owner may delete it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     text VARCHAR(255) NOT NULL,
///     due_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::models::task::{Task, CreateTask};
/// use tasklane_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let owner_id = Uuid::new_v4();
///
/// let task = Task::create(&pool, CreateTask {
///     owner_id,
///     text: "Write the quarterly report".to_string(),
///     due_at: None,
/// }).await?;
///
/// // Scoped lookup: returns None unless the caller owns or was granted the task
/// let visible = Task::find_visible(&pool, task.id, owner_id).await?;
/// assert!(visible.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// User who owns the task
    ///
    /// Set once at creation and never updated; no write path touches it.
    pub owner_id: Uuid,

    /// Task text (non-empty, at most 255 characters)
    pub text: String,

    /// Optional due date
    pub due_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub owner_id: Uuid,

    /// Task text
    pub text: String,

    /// Optional due date
    pub due_at: Option<DateTime<Utc>>,
}

/// Input for updating an existing task
///
/// Only non-None fields are written. `due_at` is doubly optional so callers
/// can distinguish "leave unchanged" (None) from "clear the due date"
/// (Some(None)).
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New task text
    pub text: Option<String>,

    /// New due date (use Some(None) to clear)
    pub due_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTask {
    /// Returns true when no field would be written
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.due_at.is_none()
    }
}

impl Task {
    /// Creates a new task
    ///
    /// # Returns
    ///
    /// The newly created task with generated ID and creation timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use tasklane_shared::models::task::{Task, CreateTask};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let task = Task::create(&pool, CreateTask {
    ///     owner_id: Uuid::new_v4(),
    ///     text: "Buy groceries".to_string(),
    ///     due_at: None,
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, text, due_at)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, text, due_at, created_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.text)
        .bind(data.due_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID without any visibility scoping
    ///
    /// Used by the grant manager, which needs the owner of a task before
    /// deciding whether the caller may manage grants on it. API read paths
    /// should use `find_visible` instead.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, text, due_at, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to what `user_id` may see
    ///
    /// This is the preferred lookup for API endpoints: it returns the task
    /// only when the user owns it or holds a sharing grant for it, so a
    /// hidden task is indistinguishable from a missing one.
    pub async fn find_visible(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, text, due_at, created_at
            FROM tasks
            WHERE id = $1
              AND (owner_id = $2 OR EXISTS (
                  SELECT 1 FROM task_access
                  WHERE task_access.task_id = tasks.id AND task_access.user_id = $2
              ))
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task visible to `user_id`
    ///
    /// The visible set is the union of owned tasks and tasks shared with the
    /// user, in insertion order.
    pub async fn list_visible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, text, due_at, created_at
            FROM tasks
            WHERE owner_id = $1 OR EXISTS (
                SELECT 1 FROM task_access
                WHERE task_access.task_id = tasks.id AND task_access.user_id = $1
            )
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update to a task
    ///
    /// Builds the UPDATE dynamically from the fields present in `data`.
    /// The owner and creation timestamp are never part of the SET clause.
    /// An empty update degrades to a plain lookup.
    ///
    /// # Returns
    ///
    /// The updated task, or None if the task no longer exists
    pub async fn update_fields(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE tasks SET ");
        let mut clauses: Vec<String> = Vec::new();
        let mut bind_count = 1;

        if data.text.is_some() {
            bind_count += 1;
            clauses.push(format!("text = ${}", bind_count));
        }
        if data.due_at.is_some() {
            bind_count += 1;
            clauses.push(format!("due_at = ${}", bind_count));
        }

        query.push_str(&clauses.join(", "));
        query.push_str(" WHERE id = $1 RETURNING id, owner_id, text, due_at, created_at");

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(text) = data.text {
            q = q.bind(text);
        }
        if let Some(due_at) = data.due_at {
            q = q.bind(due_at);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task, but only when `owner_id` actually owns it
    ///
    /// The ownership check lives in the WHERE clause, so a shared user's
    /// delete attempt affects zero rows. Grants referencing the task are
    /// removed by CASCADE.
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false otherwise
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let text_only = UpdateTask {
            text: Some("new text".to_string()),
            due_at: None,
        };
        assert!(!text_only.is_empty());

        // Clearing the due date counts as a change
        let clear_due = UpdateTask {
            text: None,
            due_at: Some(None),
        };
        assert!(!clear_due.is_empty());
    }

    #[test]
    fn test_create_task_struct() {
        let create = CreateTask {
            owner_id: Uuid::new_v4(),
            text: "Test Task".to_string(),
            due_at: None,
        };

        assert_eq!(create.text, "Test Task");
        assert!(create.due_at.is_none());
    }

    #[test]
    fn test_task_serialization_roundtrip() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            text: "Test Task".to_string(),
            due_at: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&task).expect("Should serialize");
        let parsed: Task = serde_json::from_str(&json).expect("Should deserialize");

        assert_eq!(parsed.id, task.id);
        assert_eq!(parsed.owner_id, task.owner_id);
        assert_eq!(parsed.text, task.text);
    }

    // Integration tests for database operations are in tests/store_tests.rs
}

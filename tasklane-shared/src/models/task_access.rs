/// TaskAccess model and database operations
///
/// A TaskAccess row is a sharing grant: it gives one user visibility of one
/// task. The `(task_id, user_id)` pair is unique, so a task can be shared
/// with a user at most once; the constraint also closes the race where two
/// identical grants are created concurrently.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_access (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT task_access_task_id_user_id_key UNIQUE (task_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::models::task_access::{TaskAccess, CreateTaskAccess};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, task_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// // Check before insert; the unique index backs this up under races
/// if TaskAccess::find_by_pair(&pool, task_id, user_id).await?.is_none() {
///     let grant = TaskAccess::create(&pool, CreateTaskAccess { task_id, user_id }).await?;
///     println!("Granted: {}", grant.id);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// TaskAccess model representing a sharing grant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskAccess {
    /// Unique grant ID
    pub id: Uuid,

    /// Task being shared
    pub task_id: Uuid,

    /// User receiving access
    pub user_id: Uuid,

    /// When the grant was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new grant
#[derive(Debug, Clone)]
pub struct CreateTaskAccess {
    /// Task being shared
    pub task_id: Uuid,

    /// User receiving access
    pub user_id: Uuid,
}

impl TaskAccess {
    /// Creates a new grant
    ///
    /// # Errors
    ///
    /// Returns an error on `task_access_task_id_user_id_key` unique violation
    /// (the pair is already granted) or if the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateTaskAccess) -> Result<Self, sqlx::Error> {
        let grant = sqlx::query_as::<_, TaskAccess>(
            r#"
            INSERT INTO task_access (task_id, user_id)
            VALUES ($1, $2)
            RETURNING id, task_id, user_id, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(grant)
    }

    /// Finds a grant by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let grant = sqlx::query_as::<_, TaskAccess>(
            r#"
            SELECT id, task_id, user_id, created_at
            FROM task_access
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(grant)
    }

    /// Finds a grant by its `(task, user)` pair
    ///
    /// This is the duplicate check the grant manager runs before creating a
    /// grant; at most one row can match thanks to the unique constraint.
    pub async fn find_by_pair(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let grant = sqlx::query_as::<_, TaskAccess>(
            r#"
            SELECT id, task_id, user_id, created_at
            FROM task_access
            WHERE task_id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(grant)
    }

    /// Re-points a grant at a new `(task, user)` pair
    ///
    /// # Returns
    ///
    /// The updated grant, or None if the grant no longer exists
    ///
    /// # Errors
    ///
    /// Returns an error when the new pair collides with an existing grant
    /// (unique violation)
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let grant = sqlx::query_as::<_, TaskAccess>(
            r#"
            UPDATE task_access
            SET task_id = $2, user_id = $3
            WHERE id = $1
            RETURNING id, task_id, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(grant)
    }

    /// Deletes a grant by ID
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false otherwise
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_access WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists grants the user is a party to
    ///
    /// Returns grants on tasks the user owns plus grants naming the user,
    /// in insertion order. Never returns grants between unrelated users.
    pub async fn list_involving(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let grants = sqlx::query_as::<_, TaskAccess>(
            r#"
            SELECT ta.id, ta.task_id, ta.user_id, ta.created_at
            FROM task_access ta
            JOIN tasks t ON t.id = ta.task_id
            WHERE t.owner_id = $1 OR ta.user_id = $1
            ORDER BY ta.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(grants)
    }

    /// Lists the users a task is shared with
    pub async fn shared_user_ids(pool: &PgPool, task_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT user_id
            FROM task_access
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Lists `(task_id, user_id)` pairs for a batch of tasks
    ///
    /// One query for a whole task listing, so building `shared_with` arrays
    /// does not turn into a per-task lookup.
    pub async fn shared_user_ids_for_tasks(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT task_id, user_id
            FROM task_access
            WHERE task_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_access_struct() {
        let task_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let create = CreateTaskAccess { task_id, user_id };

        assert_eq!(create.task_id, task_id);
        assert_eq!(create.user_id, user_id);
    }

    #[test]
    fn test_task_access_serialization() {
        let grant = TaskAccess {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&grant).expect("Should serialize");
        assert!(json.contains(&grant.task_id.to_string()));
        assert!(json.contains(&grant.user_id.to_string()));
    }

    // Integration tests for database operations are in tests/store_tests.rs
}

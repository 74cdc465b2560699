/// Task store: visibility and mutation rules for tasks
///
/// The rules, in one place:
///
/// - A task is **visible** to its owner and to users holding a sharing
///   grant for it. List and read operations work on the visible set and
///   report anything outside it as not found.
/// - **Update** follows the visibility rule (shared users may edit), but
///   only `text` and `due_at` are mutable. The owner is fixed at creation;
///   whatever an update request claims about ownership is discarded before
///   it gets here.
/// - **Delete** is owner-only. Sharing grants view/edit rights, never
///   destructive ones. Deleting a task removes its grants via CASCADE.
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::auth::middleware::Principal;
/// use tasklane_shared::store::tasks;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let alice = Principal { user_id: Uuid::new_v4(), username: "alice".to_string() };
///
/// let task = tasks::create(&pool, &alice, "Test Task", None).await?;
/// assert_eq!(task.owner_id, alice.user_id);
///
/// let visible = tasks::list(&pool, &alice).await?;
/// assert!(visible.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::Principal;
use crate::models::task::{CreateTask, Task, UpdateTask};

use super::StoreError;

/// Maximum length of a task's text, in characters
pub const MAX_TEXT_LENGTH: usize = 255;

/// Validates and normalizes task text
///
/// Leading and trailing whitespace is trimmed before the bounds are
/// checked, so an all-whitespace string counts as empty.
fn validate_text(text: &str) -> Result<String, StoreError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(StoreError::validation("text", "Text must not be empty"));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(StoreError::validation(
            "text",
            format!("Text must be at most {} characters", MAX_TEXT_LENGTH),
        ));
    }

    Ok(trimmed.to_string())
}

/// Lists every task visible to the principal
///
/// Returns owned tasks plus tasks shared with the principal, in insertion
/// order.
pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<Task>, StoreError> {
    let tasks = Task::list_visible(pool, principal.user_id).await?;
    Ok(tasks)
}

/// Creates a task owned by the principal
///
/// The owner is always the principal. Callers cannot create tasks on
/// another user's behalf, no matter what their request payload says.
///
/// # Errors
///
/// - `StoreError::Validation` if `text` is empty after trimming or longer
///   than [`MAX_TEXT_LENGTH`] characters
pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    text: &str,
    due_at: Option<DateTime<Utc>>,
) -> Result<Task, StoreError> {
    let text = validate_text(text)?;

    let task = Task::create(
        pool,
        CreateTask {
            owner_id: principal.user_id,
            text,
            due_at,
        },
    )
    .await?;

    tracing::info!(
        task_id = %task.id,
        owner_id = %task.owner_id,
        "Task created"
    );

    Ok(task)
}

/// Fetches a single task from the principal's visible set
///
/// # Errors
///
/// - `StoreError::NotFound` if the task does not exist or the principal
///   holds neither ownership nor a grant for it
pub async fn get(pool: &PgPool, principal: &Principal, task_id: Uuid) -> Result<Task, StoreError> {
    Task::find_visible(pool, task_id, principal.user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Task not found"))
}

/// Updates a task's mutable fields
///
/// Visibility follows the read rule: the owner and shared users may update.
/// Only `text` and `due_at` can change; `changes.due_at` distinguishes
/// "leave unchanged" (None) from "clear" (Some(None)).
///
/// # Errors
///
/// - `StoreError::NotFound` if the task is not in the principal's visible set
/// - `StoreError::Validation` if the new text is empty or too long
pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    task_id: Uuid,
    mut changes: UpdateTask,
) -> Result<Task, StoreError> {
    // Resolve before validating, so an invisible task reads as missing
    // rather than leaking a validation response
    let current = Task::find_visible(pool, task_id, principal.user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Task not found"))?;

    if let Some(text) = changes.text.take() {
        changes.text = Some(validate_text(&text)?);
    }

    if changes.is_empty() {
        return Ok(current);
    }

    let updated = Task::update_fields(pool, task_id, changes)
        .await?
        .ok_or_else(|| StoreError::not_found("Task not found"))?;

    tracing::info!(
        task_id = %updated.id,
        user_id = %principal.user_id,
        "Task updated"
    );

    Ok(updated)
}

/// Deletes a task owned by the principal
///
/// A shared user's delete attempt fails exactly like a request for a task
/// that never existed; grants confer no destructive rights and reveal no
/// extra information here.
///
/// # Errors
///
/// - `StoreError::NotFound` if the principal is not the owner or the task
///   does not exist
pub async fn delete(pool: &PgPool, principal: &Principal, task_id: Uuid) -> Result<(), StoreError> {
    let deleted = Task::delete_owned(pool, task_id, principal.user_id).await?;

    if !deleted {
        tracing::warn!(
            task_id = %task_id,
            user_id = %principal.user_id,
            "Delete refused: task missing or caller is not the owner"
        );
        return Err(StoreError::not_found("Task not found"));
    }

    tracing::info!(
        task_id = %task_id,
        owner_id = %principal.user_id,
        "Task deleted"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_trims_whitespace() {
        let result = validate_text("  Buy groceries  ").expect("Should validate");
        assert_eq!(result, "Buy groceries");
    }

    #[test]
    fn test_validate_text_rejects_empty() {
        assert!(validate_text("").is_err());
        assert!(validate_text("   ").is_err());
        assert!(validate_text("\t\n").is_err());
    }

    #[test]
    fn test_validate_text_length_bounds() {
        let max = "x".repeat(MAX_TEXT_LENGTH);
        assert!(validate_text(&max).is_ok());

        let too_long = "x".repeat(MAX_TEXT_LENGTH + 1);
        let err = validate_text(&too_long).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
        assert!(err.to_string().contains("255"));
    }

    #[test]
    fn test_validate_text_counts_characters_not_bytes() {
        // 255 multi-byte characters are still within bounds
        let unicode = "ж".repeat(MAX_TEXT_LENGTH);
        assert!(validate_text(&unicode).is_ok());

        let too_long = "ж".repeat(MAX_TEXT_LENGTH + 1);
        assert!(validate_text(&too_long).is_err());
    }

    // Integration tests for the authorization rules are in
    // tests/store_tests.rs; they need a live database.
}

/// Grant manager: owner-only sharing with duplicate protection
///
/// Grants are managed by task owners. The checks run in a fixed order so
/// the caller learns as little as possible:
///
/// 1. The referenced task must exist (otherwise not found).
/// 2. The principal must own it (otherwise permission denied, with a
///    message naming the principal).
/// 3. The referenced user must exist (otherwise a validation error).
/// 4. The `(task, user)` pair must not already be granted (otherwise a
///    validation error pointing at the update operation).
///
/// The duplicate check is backed by the `task_access_task_id_user_id_key`
/// unique index, so when two identical create requests race, the loser's
/// insert fails and is reported as the same validation error the check
/// would have produced.
///
/// Reading and revoking are scoped to the parties of a grant: the task's
/// owner and the granted user. To anyone else a grant is indistinguishable
/// from one that does not exist.
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::auth::middleware::Principal;
/// use tasklane_shared::store::{grants, tasks};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, bob_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let alice = Principal { user_id: Uuid::new_v4(), username: "alice".to_string() };
///
/// let task = tasks::create(&pool, &alice, "Test Task", None).await?;
/// let grant = grants::create(&pool, &alice, task.id, bob_id).await?;
/// assert_eq!(grant.task_id, task.id);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::Principal;
use crate::models::task::Task;
use crate::models::task_access::{CreateTaskAccess, TaskAccess};
use crate::models::user::User;

use super::{is_unique_violation, StoreError};

/// Name of the unique constraint guarding the `(task_id, user_id)` pair
pub const PAIR_CONSTRAINT: &str = "task_access_task_id_user_id_key";

fn grant_not_found() -> StoreError {
    StoreError::not_found("Access grant not found")
}

fn task_not_found() -> StoreError {
    StoreError::not_found("Task not found")
}

fn duplicate_grant() -> StoreError {
    StoreError::validation(
        "user",
        "Access to this task has already been granted to this user; use the update operation instead",
    )
}

fn unknown_user() -> StoreError {
    StoreError::validation("user", "Referenced user does not exist")
}

/// Resolves a task and checks the principal owns it
///
/// Shared by create and update: both operations anchor their authorization
/// on the task named in the request payload.
async fn require_owned_task(
    pool: &PgPool,
    principal: &Principal,
    task_id: Uuid,
    action: &str,
) -> Result<Task, StoreError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(task_not_found)?;

    if task.owner_id != principal.user_id {
        tracing::warn!(
            task_id = %task.id,
            user_id = %principal.user_id,
            "Grant management refused: caller does not own the task"
        );
        return Err(StoreError::PermissionDenied(format!(
            "User {} has no rights to {} access to this task",
            principal.username, action
        )));
    }

    Ok(task)
}

/// Creates a sharing grant on a task the principal owns
///
/// # Errors
///
/// - `StoreError::NotFound` if the task does not exist
/// - `StoreError::PermissionDenied` if the principal does not own the task
/// - `StoreError::Validation` if the user does not exist, or the pair is
///   already granted (including when a concurrent request wins the race)
pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<TaskAccess, StoreError> {
    require_owned_task(pool, principal, task_id, "grant").await?;

    if !User::exists(pool, user_id).await? {
        return Err(unknown_user());
    }

    if TaskAccess::find_by_pair(pool, task_id, user_id)
        .await?
        .is_some()
    {
        return Err(duplicate_grant());
    }

    let grant = TaskAccess::create(pool, CreateTaskAccess { task_id, user_id })
        .await
        .map_err(|e| {
            if is_unique_violation(&e, PAIR_CONSTRAINT) {
                // Lost a race against an identical create
                duplicate_grant()
            } else {
                StoreError::Database(e)
            }
        })?;

    tracing::info!(
        grant_id = %grant.id,
        task_id = %grant.task_id,
        user_id = %grant.user_id,
        "Access granted"
    );

    Ok(grant)
}

/// Fetches a single grant the principal is a party to
///
/// # Errors
///
/// - `StoreError::NotFound` if the grant does not exist or the principal is
///   neither the task's owner nor the granted user
pub async fn get(
    pool: &PgPool,
    principal: &Principal,
    grant_id: Uuid,
) -> Result<TaskAccess, StoreError> {
    let grant = TaskAccess::find_by_id(pool, grant_id)
        .await?
        .ok_or_else(grant_not_found)?;

    let task = Task::find_by_id(pool, grant.task_id)
        .await?
        .ok_or_else(grant_not_found)?;

    if task.owner_id != principal.user_id && grant.user_id != principal.user_id {
        return Err(grant_not_found());
    }

    Ok(grant)
}

/// Re-points an existing grant at a `(task, user)` pair
///
/// Authorization anchors on the task named in the request payload, not the
/// task currently stored on the grant: moving a grant onto a task demands
/// ownership of that task.
///
/// # Errors
///
/// - `StoreError::NotFound` if the grant or the requested task is missing
/// - `StoreError::PermissionDenied` if the principal does not own the
///   requested task
/// - `StoreError::Validation` if the user does not exist or the new pair
///   collides with another grant
pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    grant_id: Uuid,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<TaskAccess, StoreError> {
    let existing = TaskAccess::find_by_id(pool, grant_id)
        .await?
        .ok_or_else(grant_not_found)?;

    require_owned_task(pool, principal, task_id, "modify").await?;

    if !User::exists(pool, user_id).await? {
        return Err(unknown_user());
    }

    if let Some(other) = TaskAccess::find_by_pair(pool, task_id, user_id).await? {
        if other.id != existing.id {
            return Err(duplicate_grant());
        }
    }

    let grant = TaskAccess::update(pool, grant_id, task_id, user_id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, PAIR_CONSTRAINT) {
                duplicate_grant()
            } else {
                StoreError::Database(e)
            }
        })?
        .ok_or_else(grant_not_found)?;

    tracing::info!(
        grant_id = %grant.id,
        task_id = %grant.task_id,
        user_id = %grant.user_id,
        "Access grant updated"
    );

    Ok(grant)
}

/// Revokes a grant
///
/// Allowed for the task's owner and for the granted user relinquishing
/// their own access.
///
/// # Errors
///
/// - `StoreError::NotFound` if the grant does not exist or the principal is
///   not a party to it
pub async fn delete(
    pool: &PgPool,
    principal: &Principal,
    grant_id: Uuid,
) -> Result<(), StoreError> {
    let grant = TaskAccess::find_by_id(pool, grant_id)
        .await?
        .ok_or_else(grant_not_found)?;

    let task = Task::find_by_id(pool, grant.task_id)
        .await?
        .ok_or_else(grant_not_found)?;

    if task.owner_id != principal.user_id && grant.user_id != principal.user_id {
        tracing::warn!(
            grant_id = %grant.id,
            user_id = %principal.user_id,
            "Revoke refused: caller is not a party to the grant"
        );
        return Err(grant_not_found());
    }

    TaskAccess::delete(pool, grant_id).await?;

    tracing::info!(
        grant_id = %grant_id,
        task_id = %grant.task_id,
        revoked_user_id = %grant.user_id,
        by_user_id = %principal.user_id,
        "Access revoked"
    );

    Ok(())
}

/// Lists grants the principal is a party to
///
/// Grants on owned tasks plus grants naming the principal, in insertion
/// order. There is no way to enumerate grants between unrelated users.
pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<TaskAccess>, StoreError> {
    let grants = TaskAccess::list_involving(pool, principal.user_id).await?;
    Ok(grants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_grant_points_at_update() {
        let err = duplicate_grant();
        assert!(matches!(err, StoreError::Validation { .. }));
        assert!(err.to_string().contains("update operation"));
    }

    #[test]
    fn test_permission_denied_names_principal() {
        let err = StoreError::PermissionDenied(format!(
            "User {} has no rights to grant access to this task",
            "bob"
        ));
        assert!(err.to_string().contains("bob"));
    }

    // The ordered checks (task resolution, ownership, duplicate pair) are
    // exercised end to end in tests/store_tests.rs against a live database.
}

/// Task and grant stores
///
/// This module holds the authorization rules of the system: who may see,
/// mutate, and delete tasks, and who may manage sharing grants. Handlers in
/// the API crate stay thin and delegate here; the models underneath stay
/// dumb and just run queries.
///
/// Every operation takes the authenticated [`Principal`] as an explicit
/// argument. There is no ambient identity state to consult or forget to set.
///
/// # Modules
///
/// - [`tasks`]: visibility and mutation rules for tasks
/// - [`grants`]: owner-only grant management with duplicate protection
///
/// [`Principal`]: crate::auth::middleware::Principal

pub mod grants;
pub mod tasks;

/// Error type for store operations
///
/// `NotFound` deliberately covers both "does not exist" and "exists but is
/// outside the caller's visible set", so unauthorized callers cannot probe
/// for the existence of other users' data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Entity absent or not visible to the caller
    #[error("{0}")]
    NotFound(String),

    /// Caller is authenticated but lacks the specific right; the message
    /// names the offending principal
    #[error("{0}")]
    PermissionDenied(String),

    /// Semantically invalid input, attributed to a field
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Unexpected persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Builds a `NotFound` error
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    /// Builds a field-level validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Checks whether a sqlx error is a unique violation on a named constraint
///
/// Used to translate constraint violations raised by concurrent writes into
/// the same validation errors the ordinary check-first paths produce.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(name) = db_err.constraint() {
            return name == constraint;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Task not found");

        let err = StoreError::PermissionDenied(
            "User bob has no rights to grant access to this task".to_string(),
        );
        assert!(err.to_string().contains("bob"));

        let err = StoreError::validation("text", "Text must not be empty");
        assert_eq!(err.to_string(), "text: Text must not be empty");
    }

    #[test]
    fn test_is_unique_violation_ignores_other_errors() {
        assert!(!is_unique_violation(
            &sqlx::Error::RowNotFound,
            "task_access_task_id_user_id_key"
        ));
    }
}

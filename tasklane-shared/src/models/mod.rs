/// Database models for TaskLane
///
/// This module contains all database models and their raw queries. The
/// authorization rules that decide who may call which query live one level
/// up, in the `store` module.
///
/// # Models
///
/// - `user`: Registered accounts
/// - `task`: Tasks with owner, text, and optional due date
/// - `task_access`: Sharing grants linking tasks to non-owner users
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::models::user::{User, CreateUser};
/// use tasklane_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod task_access;
pub mod user;

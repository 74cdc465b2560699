/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: User registration
/// - `tokens`: Token obtain/refresh/verify endpoints
/// - `tasks`: Task CRUD endpoints
/// - `task_access`: Sharing grant endpoints

pub mod health;
pub mod task_access;
pub mod tasks;
pub mod tokens;
pub mod users;

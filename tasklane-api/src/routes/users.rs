/// User registration endpoint
///
/// # Endpoints
///
/// - `POST /create_user` - Register a new user account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tasklane_shared::{
    auth::password,
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Desired username
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Registration response
///
/// The password hash never leaves the server; only public account fields
/// are echoed back.
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    /// User ID
    pub id: uuid::Uuid,

    /// Username
    pub username: String,

    /// Created at
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /create_user
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": "uuid",
///   "username": "alice",
///   "created_at": "2024-06-10T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the username is already taken
/// - `500 Internal Server Error`: Server error
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    req.validate().map_err(ApiError::from)?;

    let password_hash = password::hash_password(&req.password)?;

    // Username uniqueness is enforced by the database; a losing concurrent
    // insert maps to the same validation error via the constraint name
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }),
    ))
}

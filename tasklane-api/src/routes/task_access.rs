/// Sharing grant endpoints
///
/// A grant names a `(task, user)` pair and makes the task visible to that
/// user. Grants are created and re-pointed by the task's owner only; they
/// can be read and revoked by either party. All the ordering of checks
/// (existence, ownership, duplicates) lives in the grant store; these
/// handlers translate between JSON and store calls.
///
/// # Endpoints
///
/// - `GET /task_access` - List grants the caller is party to
/// - `POST /task_access` - Grant access to a task
/// - `GET /task_access/:id` - Read one grant
/// - `PUT /task_access/:id` - Re-point a grant
/// - `DELETE /task_access/:id` - Revoke a grant

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasklane_shared::{
    auth::middleware::Principal, models::task_access::TaskAccess, store::grants,
};
use uuid::Uuid;

/// Create grant request
#[derive(Debug, Deserialize)]
pub struct CreateGrantRequest {
    /// Task to share
    pub task: Uuid,

    /// User to share it with
    pub user: Uuid,
}

/// Update grant request (PUT semantics: both fields required)
#[derive(Debug, Deserialize)]
pub struct UpdateGrantRequest {
    /// Task the grant should point at
    pub task: Uuid,

    /// User the grant should name
    pub user: Uuid,
}

/// Grant representation returned by every grant endpoint
#[derive(Debug, Serialize)]
pub struct GrantResponse {
    /// Grant ID
    pub id: Uuid,

    /// Shared task
    pub task: Uuid,

    /// User granted access
    pub user: Uuid,

    /// Created at
    pub created_at: DateTime<Utc>,
}

impl From<TaskAccess> for GrantResponse {
    fn from(grant: TaskAccess) -> Self {
        Self {
            id: grant.id,
            task: grant.task_id,
            user: grant.user_id,
            created_at: grant.created_at,
        }
    }
}

/// List grants response
#[derive(Debug, Serialize)]
pub struct ListGrantsResponse {
    /// Grants in creation order
    pub grants: Vec<GrantResponse>,
}

/// List every grant the caller is a party to
///
/// Covers grants on the caller's own tasks and grants naming the caller.
/// Grants between unrelated users never appear.
pub async fn list_grants(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ListGrantsResponse>> {
    let listed = grants::list(&state.db, &principal).await?;

    Ok(Json(ListGrantsResponse {
        grants: listed.into_iter().map(GrantResponse::from).collect(),
    }))
}

/// Grant a user access to a task
///
/// # Endpoint
///
/// ```text
/// POST /task_access
/// Authorization: Bearer <access_token>
/// Content-Type: application/json
///
/// {
///   "task": "uuid",
///   "user": "uuid"
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
///   "task": "uuid",
///   "user": "uuid",
///   "created_at": "2024-06-10T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown user, or the pair is already granted
/// - `403 Forbidden`: The caller does not own the task
/// - `404 Not Found`: The task does not exist
pub async fn create_grant(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateGrantRequest>,
) -> ApiResult<(StatusCode, Json<GrantResponse>)> {
    let grant = grants::create(&state.db, &principal, req.task, req.user).await?;

    Ok((StatusCode::CREATED, Json(GrantResponse::from(grant))))
}

/// Read a single grant
///
/// # Errors
///
/// - `404 Not Found`: The grant does not exist or the caller is not a party
pub async fn get_grant(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GrantResponse>> {
    let grant = grants::get(&state.db, &principal, id).await?;

    Ok(Json(GrantResponse::from(grant)))
}

/// Re-point an existing grant
///
/// Ownership is checked against the task named in the payload: re-pointing
/// a grant at a task requires owning that task.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown user, or the new pair collides with another grant
/// - `403 Forbidden`: The caller does not own the requested task
/// - `404 Not Found`: The grant or the requested task does not exist
pub async fn update_grant(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateGrantRequest>,
) -> ApiResult<Json<GrantResponse>> {
    let grant = grants::update(&state.db, &principal, id, req.task, req.user).await?;

    Ok(Json(GrantResponse::from(grant)))
}

/// Revoke a grant
///
/// Allowed for the task's owner and for the named user giving up their own
/// access.
///
/// # Response
///
/// `204 No Content`
///
/// # Errors
///
/// - `404 Not Found`: The grant does not exist or the caller is not a party
pub async fn delete_grant(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    grants::delete(&state.db, &principal, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

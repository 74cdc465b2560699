/// Task CRUD endpoints
///
/// All endpoints require a valid access token. Every operation is scoped to
/// the caller: listings and reads cover owned plus shared tasks, updates
/// work on any visible task, deletion is owner-only. A task outside the
/// caller's visible set yields 404 everywhere.
///
/// # Endpoints
///
/// - `GET /tasks` - List visible tasks
/// - `POST /tasks` - Create a task
/// - `GET /tasks/:id` - Read one visible task
/// - `PUT /tasks/:id` - Update one visible task
/// - `DELETE /tasks_delete/:id` - Delete an owned task

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tasklane_shared::{
    auth::middleware::Principal,
    models::task::{Task, UpdateTask},
    models::task_access::TaskAccess,
    store::tasks,
};
use uuid::Uuid;

/// Deserializes a due date that distinguishes "absent" from "null"
///
/// Combined with `#[serde(default)]`: a missing field becomes `None`
/// (leave unchanged), an explicit `null` becomes `Some(None)` (clear), and
/// a timestamp becomes `Some(Some(..))`.
fn deserialize_clearable_date<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task text
    pub text: String,

    /// Optional due date
    pub due_at: Option<DateTime<Utc>>,

    /// Accepted for wire compatibility and discarded; the created task is
    /// always owned by the caller
    #[serde(default)]
    pub owner: Option<Uuid>,
}

/// Update task request (PUT semantics: text is required)
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// Replacement task text
    pub text: String,

    /// Replacement due date; omit to keep, send null to clear
    #[serde(default, deserialize_with = "deserialize_clearable_date")]
    pub due_at: Option<Option<DateTime<Utc>>>,

    /// Accepted for wire compatibility and discarded; ownership never moves
    #[serde(default)]
    pub owner: Option<Uuid>,
}

/// Task representation returned by every task endpoint
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Owning user
    pub owner: Uuid,

    /// Task text
    pub text: String,

    /// Due date
    pub due_at: Option<DateTime<Utc>>,

    /// Created at
    pub created_at: DateTime<Utc>,

    /// Users this task is shared with
    pub shared_with: Vec<Uuid>,
}

impl TaskResponse {
    fn from_task(task: Task, shared_with: Vec<Uuid>) -> Self {
        Self {
            id: task.id,
            owner: task.owner_id,
            text: task.text,
            due_at: task.due_at,
            created_at: task.created_at,
            shared_with,
        }
    }
}

/// List tasks response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Visible tasks in creation order
    pub tasks: Vec<TaskResponse>,
}

/// List every task visible to the caller
///
/// # Endpoint
///
/// ```text
/// GET /tasks
/// Authorization: Bearer <access_token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "tasks": [
///     {
///       "id": "uuid",
///       "owner": "uuid",
///       "text": "Water the plants",
///       "due_at": null,
///       "created_at": "2024-06-10T12:00:00Z",
///       "shared_with": ["uuid"]
///     }
///   ]
/// }
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ListTasksResponse>> {
    let listed = tasks::list(&state.db, &principal).await?;

    // One query for all shared_with arrays instead of one per task
    let task_ids: Vec<Uuid> = listed.iter().map(|t| t.id).collect();
    let pairs = TaskAccess::shared_user_ids_for_tasks(&state.db, &task_ids).await?;

    let mut shared: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (task_id, user_id) in pairs {
        shared.entry(task_id).or_default().push(user_id);
    }

    let tasks = listed
        .into_iter()
        .map(|task| {
            let shared_with = shared.remove(&task.id).unwrap_or_default();
            TaskResponse::from_task(task, shared_with)
        })
        .collect();

    Ok(Json(ListTasksResponse { tasks }))
}

/// Create a task
///
/// The new task is owned by the caller. Any `owner` value in the payload is
/// discarded, so clients cannot create tasks on someone else's behalf.
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <access_token>
/// Content-Type: application/json
///
/// {
///   "text": "Water the plants",
///   "due_at": "2024-06-11T09:00:00Z"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the task body.
///
/// # Errors
///
/// - `400 Bad Request`: Empty or over-long text
/// - `401 Unauthorized`: Missing or invalid token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = tasks::create(&state.db, &principal, &req.text, req.due_at).await?;

    // A freshly created task has no grants yet
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::from_task(task, Vec::new())),
    ))
}

/// Read a single visible task
///
/// # Errors
///
/// - `404 Not Found`: The task does not exist or is not visible to the caller
pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = tasks::get(&state.db, &principal, id).await?;
    let shared_with = TaskAccess::shared_user_ids(&state.db, task.id).await?;

    Ok(Json(TaskResponse::from_task(task, shared_with)))
}

/// Update a visible task
///
/// Owners and grantees may update. The `owner` payload field is discarded;
/// a task keeps its creator for life.
///
/// # Errors
///
/// - `400 Bad Request`: Empty or over-long text
/// - `404 Not Found`: The task does not exist or is not visible to the caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let changes = UpdateTask {
        text: Some(req.text),
        due_at: req.due_at,
    };

    let task = tasks::update(&state.db, &principal, id, changes).await?;
    let shared_with = TaskAccess::shared_user_ids(&state.db, task.id).await?;

    Ok(Json(TaskResponse::from_task(task, shared_with)))
}

/// Delete an owned task
///
/// Only the owner can delete; for a grantee the task is read-and-update
/// only, and the delete attempt reports 404. Sharing grants on the task are
/// removed with it.
///
/// # Endpoint
///
/// ```text
/// DELETE /tasks_delete/:id
/// Authorization: Bearer <access_token>
/// ```
///
/// # Response
///
/// `204 No Content`
///
/// # Errors
///
/// - `404 Not Found`: The task does not exist or the caller does not own it
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tasks::delete(&state.db, &principal, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

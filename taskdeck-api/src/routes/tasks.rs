/// Task endpoints
///
/// All endpoints here require authentication; handlers receive the
/// caller's `AuthContext` from request extensions and derive a
/// `Visibility` from it once. Staff callers see every task, everyone
/// else sees only their own, and a task outside the caller's
/// visibility is indistinguishable from one that does not exist
/// (`404`, never `403`).
///
/// # Endpoints
///
/// - `GET    /tasks` - List visible tasks (newest first, paginated)
/// - `POST   /tasks` - Create task owned by the caller
/// - `GET    /tasks/:id` - Retrieve a task
/// - `PUT    /tasks/:id` - Full update
/// - `PATCH  /tasks/:id` - Partial update
/// - `DELETE /tasks/:id` - Delete a task
/// - `POST   /tasks/:id/complete` - Mark a task done

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::scope::{AuthContext, Visibility},
    models::task::{CreateTask, Task, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Task representation returned by the API
///
/// The owner is exposed by username rather than by ID.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Owner's username
    pub owner: String,

    /// Task title
    pub title: String,

    /// Task description
    pub description: Option<String>,

    /// Task status ("New", "Active", or "Done")
    pub status: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            owner: task.owner_username,
            title: task.title,
            description: task.description,
            status: task.status.as_str().to_string(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Query parameters for task listing
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Status filter; unrecognized values are ignored
    pub status: Option<String>,

    /// Page number (1-based)
    pub page: Option<u32>,
}

/// Paginated task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    /// Tasks on this page, newest first
    pub results: Vec<TaskResponse>,

    /// Page number (1-based)
    pub page: u32,

    /// Page size
    pub page_size: u32,

    /// Whether another page exists
    pub has_next: bool,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(
        min = 1,
        max = 128,
        message = "Title must be between 1 and 128 characters"
    ))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status; defaults to "New"
    pub status: Option<String>,
}

/// Update task request (PUT and PATCH)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(
        min = 1,
        max = 128,
        message = "Title must be between 1 and 128 characters"
    ))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<String>,
}

impl UpdateTaskRequest {
    /// Converts to the model-level update, rejecting bad status values
    fn into_update(self) -> Result<UpdateTask, ApiError> {
        let status = match self.status {
            Some(raw) => Some(parse_status_strict(&raw)?),
            None => None,
        };

        Ok(UpdateTask {
            title: self.title,
            description: self.description,
            status,
        })
    }
}

/// Parses a status value in a request body
///
/// Unlike the lenient list filter, status values submitted in a write
/// are rejected with a 400 when unrecognized.
fn parse_status_strict(raw: &str) -> Result<TaskStatus, ApiError> {
    TaskStatus::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid status '{}': expected one of New, Active, Done",
            raw
        ))
    })
}

/// List visible tasks
///
/// Returns the caller's tasks (all tasks for staff), newest first.
/// An unrecognized `status` filter is silently ignored rather than
/// rejected, so the response is the unfiltered listing.
///
/// # Endpoint
///
/// ```text
/// GET /tasks?status=Active&page=2
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let visibility = Visibility::for_caller(&auth);

    // Lenient filter: an unknown status simply drops the filter
    let status = query.status.as_deref().and_then(TaskStatus::parse);

    let page = query.page.unwrap_or(1).max(1);
    let page_size = state.config.api.page_size;

    // Fetch one extra row to learn whether another page exists without
    // a separate COUNT query
    let limit = i64::from(page_size) + 1;
    let offset = i64::from(page - 1) * i64::from(page_size);

    let mut tasks = Task::list_visible(&state.db, &visibility, status, limit, offset).await?;

    let has_next = tasks.len() > page_size as usize;
    tasks.truncate(page_size as usize);

    Ok(Json(TaskListResponse {
        results: tasks.into_iter().map(TaskResponse::from).collect(),
        page,
        page_size,
        has_next,
    }))
}

/// Create a task
///
/// The task is always owned by the caller; ownership cannot be
/// assigned in the request body.
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "title": "Write release notes",
///   "description": "Cover the pagination changes",
///   "status": "New"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or invalid status
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    let status = match req.status {
        Some(raw) => parse_status_strict(&raw)?,
        None => TaskStatus::default(),
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
            status,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, owner_id = %auth.user_id, "Created task");

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// Retrieve a single task
///
/// # Errors
///
/// - `404 Not Found`: Task missing or outside the caller's visibility
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let visibility = Visibility::for_caller(&auth);

    let task = Task::find_visible(&state.db, &visibility, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Full update (PUT)
///
/// Requires a title; other fields keep their current value when
/// omitted. Uses the same partial-update machinery as PATCH.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or invalid status
/// - `404 Not Found`: Task missing or outside the caller's visibility
pub async fn replace_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    if req.title.is_none() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    apply_update(&state, &auth, id, req).await
}

/// Partial update (PATCH)
///
/// Only the provided fields change. An empty body is a no-op that
/// returns the current task.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or invalid status
/// - `404 Not Found`: Task missing or outside the caller's visibility
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    apply_update(&state, &auth, id, req).await
}

async fn apply_update(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
    req: UpdateTaskRequest,
) -> ApiResult<Json<TaskResponse>> {
    let visibility = Visibility::for_caller(auth);
    let update = req.into_update()?;

    if update.is_empty() {
        // Nothing to change; still 404 if the task is not visible
        let task = Task::find_visible(&state.db, &visibility, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
        return Ok(Json(TaskResponse::from(task)));
    }

    let task = Task::update_visible(&state.db, &visibility, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: Task missing or outside the caller's visibility
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let visibility = Visibility::for_caller(&auth);

    let deleted = Task::delete_visible(&state.db, &visibility, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::debug!(task_id = %id, "Deleted task");

    Ok(StatusCode::NO_CONTENT)
}

/// Mark a task done
///
/// Idempotent: completing an already-done task succeeds and returns
/// the task unchanged.
///
/// # Endpoint
///
/// ```text
/// POST /tasks/:id/complete
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Task missing or outside the caller's visibility
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let visibility = Visibility::for_caller(&auth);

    let task = Task::complete_visible(&state.db, &visibility, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tasks::dto::{CreateTaskRequest, TaskResponse, ToggleResponse, UpdateTaskRequest};
use crate::tasks::service::{self, TaskFields};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/toggle", post(toggle_task))
}

#[instrument(skip(state))]
async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = service::list_for_owner(&state.db, user_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[instrument(skip(state, payload))]
async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = service::create(
        &state.db,
        user_id,
        TaskFields {
            title: &payload.title,
            description: payload.description.as_deref(),
            due_date: payload.due_date.as_deref(),
            priority: &payload.priority,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

#[instrument(skip(state))]
async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = service::get_if_owned(&state.db, id, user_id).await?;
    Ok(Json(task.into()))
}

#[instrument(skip(state, payload))]
async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = service::update(
        &state.db,
        id,
        user_id,
        TaskFields {
            title: &payload.title,
            description: payload.description.as_deref(),
            due_date: payload.due_date.as_deref(),
            priority: &payload.priority,
        },
        payload.status,
    )
    .await?;
    Ok(Json(task.into()))
}

#[instrument(skip(state))]
async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    service::delete(&state.db, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn toggle_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let status = service::toggle_status(&state.db, id, user_id).await?;
    Ok(Json(ToggleResponse { status }))
}

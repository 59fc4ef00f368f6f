//! Fulfilment task endpoints.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use clientdesk_commerce::TaskUpdate;
use clientdesk_core::commerce::Task;
use clientdesk_web::{AppError, CurrentUser, JsonBody, RequireAdmin};

/// GET /api/tasks: own tasks, or all for admins.
pub async fn list(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.tasks.list(&user).await?))
}

/// GET /api/tasks/:id
pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks.get(&user, &id).await?))
}

/// PATCH /api/tasks/:id
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks.update(&id, update).await?))
}

/// DELETE /api/tasks/:id
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.tasks.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

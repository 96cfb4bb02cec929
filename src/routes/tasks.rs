//! Task endpoints: create, fetch, replace and move between columns

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::database::models::TaskItem;
use crate::routes::error::ApiError;
use crate::routes::extract::{ApiJson, ApiPath, ApiQuery};
use crate::server::AppState;
use crate::services::task_lifecycle::{CreateTaskRequest, UpdateTaskRequest};

#[derive(Debug, Deserialize)]
pub struct MoveQuery {
    #[serde(rename = "newStatus")]
    pub new_status: String,
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.tasks.create_task(payload).await?;
    let location = format!("/tasks/{}", task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<TaskItem>, ApiError> {
    Ok(Json(state.tasks.get_task(id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateTaskRequest>,
) -> Result<StatusCode, ApiError> {
    state.tasks.update_task(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<MoveQuery>,
) -> Result<Json<TaskItem>, ApiError> {
    Ok(Json(state.tasks.move_task(id, &query.new_status).await?))
}

pub fn create_task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task))
        .route("/tasks/{id}/move", put(move_task))
}

//! Board endpoints

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use crate::database::models::Board;
use crate::routes::error::ApiError;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::server::AppState;
use crate::services::task_lifecycle::CreateBoardRequest;

pub async fn create_board(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let board = state.tasks.create_board(payload).await?;
    let location = format!("/boards/{}", board.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(board)))
}

/// Every board with its tasks
pub async fn list_boards(State(state): State<AppState>) -> Result<Json<Vec<Board>>, ApiError> {
    Ok(Json(state.tasks.list_boards().await?))
}

pub async fn get_board(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Board>, ApiError> {
    Ok(Json(state.tasks.get_board(id).await?))
}

pub fn create_board_routes() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/{id}", get(get_board))
}

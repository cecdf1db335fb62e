// src/handlers/tasks.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    generation::ChapterSummary,
    models::task::SaveTasksRequest,
    state::AppState,
};

/// DTO for `POST /api/generate-tasks`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTasksRequest {
    pub chapter_data: Option<ChapterSummary>,
}

/// Asks the LLM for new multiple-choice tasks for a chapter.
///
/// Returns the validated drafts; nothing is saved until the client posts
/// them to `/api/save-tasks`.
pub async fn generate_tasks(
    State(state): State<AppState>,
    Json(req): Json<GenerateTasksRequest>,
) -> Result<impl IntoResponse, AppError> {
    let chapter = req
        .chapter_data
        .ok_or(AppError::BadRequest("Chapter data is required".to_string()))?;

    let drafts = state.generator.generate(&chapter).await?;

    Ok(Json(drafts))
}

/// Persists tasks for a chapter.
///
/// * Validates every task before touching the store.
/// * Saves all tasks or none.
pub async fn save_tasks(
    State(state): State<AppState>,
    Json(req): Json<SaveTasksRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.tasks.is_empty() {
        return Err(AppError::BadRequest("Tasks array is required".to_string()));
    }
    let chapter_id = req
        .chapter_id
        .ok_or(AppError::BadRequest("Chapter ID is required".to_string()))?;

    req.validate()?;

    tracing::info!("Saving {} tasks for chapter {}", req.tasks.len(), chapter_id);
    let saved = state.chapters.save_tasks(chapter_id, req.tasks).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Successfully saved {} tasks", saved.len()),
        "tasks": saved,
    })))
}

// src/handlers/chapters.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::AppError, repository::ChapterRepository};

/// Lists all chapters with their tasks.
pub async fn list_chapters(
    State(repo): State<Arc<dyn ChapterRepository>>,
) -> Result<impl IntoResponse, AppError> {
    let chapters = repo.list_chapters_with_tasks().await?;
    Ok(Json(chapters))
}

/// Retrieves a single chapter by ID.
pub async fn get_chapter(
    State(repo): State<Arc<dyn ChapterRepository>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let chapter = repo
        .get_chapter(id)
        .await?
        .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    Ok(Json(chapter))
}

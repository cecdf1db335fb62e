// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// DTO for starting a quiz session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub chapter_id: Uuid,
    /// Progress is recorded only for identified users.
    pub user_id: Option<Uuid>,
}

/// DTO for answering the current question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option: String,
}

/// Starts a quiz over the chapter's multiple-choice tasks.
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let chapter = state
        .chapters
        .get_chapter(req.chapter_id)
        .await?
        .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    let view = state.sessions.create(
        chapter.chapter.id,
        chapter.chapter.title.clone(),
        req.user_id,
        chapter.quiz_tasks(),
    )?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.sessions.view(id)?))
}

/// Scores the selected option. Repeated answers to the same question are ignored.
pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (view, scored) = state.sessions.answer(id, &req.option)?;

    if let Some(scored) = scored {
        // The answer already counts for the session; a failed write only loses history.
        if let Err(e) = state
            .chapters
            .record_progress(scored.user_id, scored.task_id, scored.correct)
            .await
        {
            tracing::error!("Failed to record progress for user {}: {}", scored.user_id, e);
        }
    }

    Ok(Json(view))
}

/// Moves to the next question, the remediation pass, or completion.
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.sessions.advance(id)?))
}

/// Ends the session and discards its state.
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.sessions.reset(id) {
        return Err(AppError::NotFound("Quiz session not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

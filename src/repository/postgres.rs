// src/repository/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        chapter::{Chapter, ChapterWithTasks},
        task::{NewTask, Task},
    },
    repository::ChapterRepository,
};

const TASK_COLUMNS: &str =
    "id, chapter_id, type, difficulty, points, time_estimate, content, created_at";

/// Chapter repository over the 'chapters', 'tasks' and 'user_progress' tables.
#[derive(Debug, Clone)]
pub struct PgChapterRepository {
    pool: PgPool,
}

impl PgChapterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChapterRepository for PgChapterRepository {
    async fn list_chapters_with_tasks(&self) -> Result<Vec<ChapterWithTasks>, AppError> {
        let chapters = sqlx::query_as::<_, Chapter>(
            r#"
            SELECT id, title, description, grammar_focus, vocabulary_themes
            FROM chapters
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch chapters: {:?}", e);
            AppError::from(e)
        })?;

        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch tasks: {:?}", e);
            AppError::from(e)
        })?;

        let mut by_chapter: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_chapter.entry(task.chapter_id).or_default().push(task);
        }

        Ok(chapters
            .into_iter()
            .map(|chapter| ChapterWithTasks {
                tasks: by_chapter.remove(&chapter.id).unwrap_or_default(),
                chapter,
            })
            .collect())
    }

    async fn get_chapter(&self, id: Uuid) -> Result<Option<ChapterWithTasks>, AppError> {
        let Some(chapter) = sqlx::query_as::<_, Chapter>(
            r#"
            SELECT id, title, description, grammar_focus, vocabulary_themes
            FROM chapters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE chapter_id = $1 ORDER BY seq"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ChapterWithTasks { chapter, tasks }))
    }

    async fn save_tasks(&self, chapter_id: Uuid, tasks: Vec<NewTask>) -> Result<Vec<Task>, AppError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM chapters WHERE id = $1")
            .bind(chapter_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Chapter not found".to_string()));
        }

        let insert = format!(
            r#"
            INSERT INTO tasks (id, chapter_id, type, difficulty, points, time_estimate, content)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let mut saved = Vec::with_capacity(tasks.len());
        for task in tasks {
            let row = sqlx::query_as::<_, Task>(&insert)
                .bind(Uuid::new_v4())
                .bind(chapter_id)
                .bind(task.task_type)
                .bind(task.difficulty)
                .bind(task.points)
                .bind(task.time_estimate)
                .bind(Json(task.content))
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to insert task: {:?}", e);
                    AppError::from(e)
                })?;
            saved.push(row);
        }

        tx.commit().await?;
        tracing::info!("Saved {} tasks for chapter {}", saved.len(), chapter_id);
        Ok(saved)
    }

    async fn record_progress(&self, user_id: Uuid, task_id: Uuid, correct: bool) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_progress (id, user_id, task_id, correct)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, task_id) DO UPDATE SET
                correct = EXCLUDED.correct,
                attempts = user_progress.attempts + 1,
                last_attempt = CURRENT_TIMESTAMP
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(task_id)
        .bind(correct)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// src/repository/mod.rs

//! Chapter and task persistence.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        chapter::ChapterWithTasks,
        task::{NewTask, Task},
    },
};

pub use memory::MemoryChapterRepository;
pub use postgres::PgChapterRepository;

#[async_trait]
pub trait ChapterRepository: Send + Sync {
    /// All chapters with their tasks in insertion order.
    async fn list_chapters_with_tasks(&self) -> Result<Vec<ChapterWithTasks>, AppError>;

    async fn get_chapter(&self, id: Uuid) -> Result<Option<ChapterWithTasks>, AppError>;

    /// Appends `tasks` to the chapter. All or nothing; unknown chapter is `NotFound`.
    async fn save_tasks(&self, chapter_id: Uuid, tasks: Vec<NewTask>) -> Result<Vec<Task>, AppError>;

    /// Upserts the user's latest result on a task and bumps its attempt count.
    async fn record_progress(&self, user_id: Uuid, task_id: Uuid, correct: bool) -> Result<(), AppError>;
}

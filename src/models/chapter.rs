// src/models/chapter.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::models::task::Task;

/// Represents the 'chapters' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub grammar_focus: Vec<String>,
    pub vocabulary_themes: Vec<String>,
}

/// A chapter together with its tasks in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterWithTasks {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub tasks: Vec<Task>,
}

impl ChapterWithTasks {
    /// The tasks a quiz session can score, in chapter order.
    pub fn quiz_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_multiple_choice())
            .cloned()
            .collect()
    }
}

// src/generation/mod.rs

//! LLM-backed task generation for a chapter.

pub mod client;
pub mod prompt;
pub mod schema;

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

pub use client::OpenAiGenerator;
pub use schema::{MAX_DRAFTS, TaskDraft, parse_drafts};

/// Chapter summary the generator works from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grammar_focus: Vec<String>,
    #[serde(default)]
    pub vocabulary_themes: Vec<String>,
    /// Existing tasks, passed to the model as examples.
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

#[derive(Debug)]
pub enum GenerationError {
    MissingApiKey,
    Transport(String),
    Upstream { status: u16, body: String },
    EmptyCompletion,
    /// The model answered, but not with a valid batch of tasks.
    InvalidFormat(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::MissingApiKey => write!(f, "LLM API key is not configured"),
            GenerationError::Transport(msg) => write!(f, "LLM request failed: {msg}"),
            GenerationError::Upstream { status, body } => {
                write!(f, "LLM API error ({status}): {body}")
            }
            GenerationError::EmptyCompletion => write!(f, "No content returned from LLM"),
            GenerationError::InvalidFormat(msg) => write!(f, "Invalid task format: {msg}"),
        }
    }
}

impl std::error::Error for GenerationError {}

#[async_trait]
pub trait TaskGenerator: Send + Sync {
    /// Produces up to [`MAX_DRAFTS`] validated multiple-choice drafts.
    async fn generate(&self, chapter: &ChapterSummary) -> Result<Vec<TaskDraft>, GenerationError>;
}

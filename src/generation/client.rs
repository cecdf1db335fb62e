// src/generation/client.rs

//! Chat-completions client that turns a chapter summary into task drafts.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::generation::{
    ChapterSummary, GenerationError, TaskDraft, TaskGenerator, parse_drafts, prompt,
};

const MAX_TOKENS: u32 = 3000;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Task generator backed by an OpenAI-compatible chat-completions endpoint.
///
/// A single attempt per call; the user re-triggers generation on failure.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
}

impl OpenAiGenerator {
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GenerationError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            api_url: config.openai_api_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one completion request and returns the trimmed message text.
    async fn complete(&self, system: String, user: String) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("failed to read response body: {e}")))?;
        debug!(status = %status, "completion response received");

        if !status.is_success() {
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Transport(format!("failed to parse API response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

#[async_trait]
impl TaskGenerator for OpenAiGenerator {
    async fn generate(&self, chapter: &ChapterSummary) -> Result<Vec<TaskDraft>, GenerationError> {
        let content = self
            .complete(prompt::system_prompt(), prompt::user_prompt(chapter))
            .await?;

        let drafts = parse_drafts(&content).inspect_err(|e| {
            tracing::warn!("Rejected generated tasks for '{}': {}", chapter.title, e);
        })?;

        tracing::info!("Generated {} tasks for '{}'", drafts.len(), chapter.title);
        Ok(drafts)
    }
}

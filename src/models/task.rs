// src/models/task.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

pub const MULTIPLE_CHOICE: &str = "multiple-choice";

/// Known task kinds as stored in the `tasks.type` column.
pub const TASK_TYPES: [&str; 4] = [MULTIPLE_CHOICE, "fill-blank", "essay", "listening"];

/// Number of options a multiple-choice question carries.
pub const OPTION_COUNT: usize = 4;

/// Represents the 'tasks' table in the database.
/// A task is one quiz question belonging to exactly one chapter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    pub chapter_id: Uuid,

    /// Task type: 'multiple-choice', 'fill-blank', 'essay' or 'listening'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub task_type: String,

    pub difficulty: String,

    pub points: i32,

    /// Expected time to solve, in seconds.
    pub time_estimate: i32,

    /// Kind-specific payload, stored as JSONB.
    pub content: Json<TaskContent>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self.content.0, TaskContent::MultipleChoice(_))
    }

    pub fn multiple_choice(&self) -> Option<&MultipleChoiceContent> {
        match &self.content.0 {
            TaskContent::MultipleChoice(mc) => Some(mc),
            _ => None,
        }
    }
}

/// Kind-specific task content.
///
/// The JSONB column carries no tag; the shape of the object decides the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskContent {
    MultipleChoice(MultipleChoiceContent),
    FillBlank(FillBlankContent),
    Essay(EssayContent),
}

impl TaskContent {
    /// Whether this content shape is the one stored for `task_type`.
    /// Listening tasks are asked as multiple-choice questions.
    pub fn fits_type(&self, task_type: &str) -> bool {
        match self {
            TaskContent::MultipleChoice(_) => {
                task_type == MULTIPLE_CHOICE || task_type == "listening"
            }
            TaskContent::FillBlank(_) => task_type == "fill-blank",
            TaskContent::Essay(_) => task_type == "essay",
        }
    }

    /// The single option text that scores, if this kind has one.
    pub fn correct_answer(&self) -> Option<&str> {
        match self {
            TaskContent::MultipleChoice(mc) => Some(&mc.correct_answer),
            TaskContent::FillBlank(_) | TaskContent::Essay(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceContent {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub hint: Option<String>,
}

impl MultipleChoiceContent {
    /// Four distinct options, one of which is the correct answer.
    pub fn check_options(&self) -> Result<(), validator::ValidationError> {
        if self.options.len() != OPTION_COUNT {
            return Err(validator::ValidationError::new("option_count"));
        }
        validate_distinct(&self.options)?;
        if !self.options.contains(&self.correct_answer) {
            return Err(validator::ValidationError::new("answer_not_in_options"));
        }
        Ok(())
    }
}

pub(crate) fn validate_distinct(options: &[String]) -> Result<(), validator::ValidationError> {
    let unique: HashSet<&str> = options.iter().map(String::as_str).collect();
    if unique.len() != options.len() {
        return Err(validator::ValidationError::new("duplicate_options"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blank {
    pub position: u32,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillBlankContent {
    pub sentence: String,
    pub blanks: Vec<Blank>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayContent {
    pub prompt: String,
    pub min_words: u32,
    pub max_words: u32,
}

/// DTO for a task about to be inserted (id and timestamp are assigned on save).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_new_task))]
pub struct NewTask {
    #[serde(rename = "type")]
    #[validate(custom(function = validate_task_type))]
    pub task_type: String,
    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,
    #[validate(range(min = 0, max = 1000))]
    pub points: i32,
    #[validate(range(min = 1, max = 3600))]
    pub time_estimate: i32,
    pub content: TaskContent,
}

fn validate_task_type(task_type: &str) -> Result<(), validator::ValidationError> {
    if !TASK_TYPES.contains(&task_type) {
        return Err(validator::ValidationError::new("invalid_task_type"));
    }
    Ok(())
}

fn validate_new_task(task: &NewTask) -> Result<(), validator::ValidationError> {
    if !task.content.fits_type(&task.task_type) {
        return Err(validator::ValidationError::new("content_does_not_match_type"));
    }
    match &task.content {
        TaskContent::MultipleChoice(mc) => mc.check_options(),
        TaskContent::FillBlank(_) | TaskContent::Essay(_) => Ok(()),
    }
}

/// DTO for `POST /api/save-tasks`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveTasksRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Tasks array is required"))]
    #[validate(nested)]
    pub tasks: Vec<NewTask>,
    pub chapter_id: Option<Uuid>,
}

#[cfg(test)]
pub(crate) fn multiple_choice_task(correct: &str) -> Task {
    Task {
        id: Uuid::new_v4(),
        chapter_id: Uuid::nil(),
        task_type: MULTIPLE_CHOICE.to_string(),
        difficulty: "easy".to_string(),
        points: 5,
        time_estimate: 60,
        content: Json(TaskContent::MultipleChoice(MultipleChoiceContent {
            question: format!("Which one is {correct}?"),
            options: ["A", "B", "C", "D"].map(String::from).to_vec(),
            correct_answer: correct.to_string(),
            hint: Some("Think about it".to_string()),
        })),
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_shape_selects_kind() {
        let mc: TaskContent = serde_json::from_value(json!({
            "question": "Wie heißt du?",
            "options": ["Ich", "Du", "Er", "Sie"],
            "correctAnswer": "Ich",
            "hint": "first person"
        }))
        .unwrap();
        assert_eq!(mc.correct_answer(), Some("Ich"));

        let fill: TaskContent = serde_json::from_value(json!({
            "sentence": "Ich ___ Anna.",
            "blanks": [{"position": 4, "answer": "heiße"}]
        }))
        .unwrap();
        assert!(matches!(fill, TaskContent::FillBlank(_)));
        assert_eq!(fill.correct_answer(), None);

        let essay: TaskContent = serde_json::from_value(json!({
            "prompt": "Beschreibe deine Familie.",
            "minWords": 30,
            "maxWords": 80
        }))
        .unwrap();
        assert!(matches!(essay, TaskContent::Essay(_)));
    }

    #[test]
    fn save_request_rejects_unknown_type() {
        let req: SaveTasksRequest = serde_json::from_value(json!({
            "chapterId": Uuid::nil(),
            "tasks": [{
                "type": "crossword",
                "difficulty": "easy",
                "points": 5,
                "timeEstimate": 60,
                "content": {"prompt": "x", "minWords": 1, "maxWords": 2}
            }]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    fn save_request(content: serde_json::Value, task_type: &str) -> SaveTasksRequest {
        serde_json::from_value(json!({
            "chapterId": Uuid::nil(),
            "tasks": [{
                "type": task_type,
                "difficulty": "easy",
                "points": 5,
                "timeEstimate": 60,
                "content": content
            }]
        }))
        .unwrap()
    }

    #[test]
    fn save_request_checks_multiple_choice_options() {
        let unanswerable = save_request(
            json!({"question": "?", "options": ["a"], "correctAnswer": "zzz"}),
            MULTIPLE_CHOICE,
        );
        assert!(unanswerable.validate().is_err());

        let duplicated = save_request(
            json!({"question": "?", "options": ["a", "a", "b", "c"], "correctAnswer": "a"}),
            MULTIPLE_CHOICE,
        );
        assert!(duplicated.validate().is_err());

        let answer_missing = save_request(
            json!({"question": "?", "options": ["a", "b", "c", "d"], "correctAnswer": "e"}),
            MULTIPLE_CHOICE,
        );
        assert!(answer_missing.validate().is_err());

        let ok = save_request(
            json!({"question": "?", "options": ["a", "b", "c", "d"], "correctAnswer": "d"}),
            MULTIPLE_CHOICE,
        );
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn save_request_checks_type_against_content() {
        let essay = json!({"prompt": "x", "minWords": 1, "maxWords": 2});
        assert!(save_request(essay.clone(), MULTIPLE_CHOICE).validate().is_err());
        assert!(save_request(essay, "essay").validate().is_ok());

        let choice = json!({"question": "?", "options": ["a", "b", "c", "d"], "correctAnswer": "a"});
        assert!(save_request(choice.clone(), "fill-blank").validate().is_err());
        assert!(save_request(choice, "listening").validate().is_ok());
    }

    #[test]
    fn save_request_requires_tasks() {
        let req: SaveTasksRequest =
            serde_json::from_value(json!({ "chapterId": Uuid::nil() })).unwrap();
        assert!(req.validate().is_err());
    }
}

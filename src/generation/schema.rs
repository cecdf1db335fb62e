// src/generation/schema.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::generation::GenerationError;
use crate::models::task::{
    MULTIPLE_CHOICE, MultipleChoiceContent, NewTask, TaskContent, validate_distinct,
};

pub const MAX_DRAFTS: usize = 10;

const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];
const POINTS: [i32; 3] = [5, 10, 15];
const TIME_ESTIMATES: [i32; 3] = [60, 90, 120];

/// A generated multiple-choice task, not yet saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(rename = "type")]
    pub task_type: String,
    pub difficulty: String,
    pub points: i32,
    pub time_estimate: i32,
    #[validate(nested)]
    pub content: DraftContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DraftContent {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(length(equal = 4), custom(function = validate_distinct))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    pub hint: String,
}

impl TaskDraft {
    fn check(&self, index: usize) -> Result<(), GenerationError> {
        let invalid = |msg: String| GenerationError::InvalidFormat(format!("task {index}: {msg}"));

        self.validate().map_err(|e| invalid(e.to_string()))?;

        if self.task_type != MULTIPLE_CHOICE {
            return Err(invalid(format!("unsupported type '{}'", self.task_type)));
        }
        if !DIFFICULTIES.contains(&self.difficulty.as_str()) {
            return Err(invalid(format!("unknown difficulty '{}'", self.difficulty)));
        }
        if !POINTS.contains(&self.points) {
            return Err(invalid(format!("points must be one of {POINTS:?}")));
        }
        if !TIME_ESTIMATES.contains(&self.time_estimate) {
            return Err(invalid(format!("timeEstimate must be one of {TIME_ESTIMATES:?}")));
        }
        if !self.content.options.contains(&self.content.correct_answer) {
            return Err(invalid("correctAnswer is not one of the options".to_string()));
        }
        Ok(())
    }

    pub fn into_new_task(self) -> NewTask {
        NewTask {
            task_type: self.task_type,
            difficulty: self.difficulty,
            points: self.points,
            time_estimate: self.time_estimate,
            content: TaskContent::MultipleChoice(MultipleChoiceContent {
                question: self.content.question,
                options: self.content.options,
                correct_answer: self.content.correct_answer,
                hint: Some(self.content.hint),
            }),
        }
    }
}

/// Removes a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses and validates a model completion. The batch is accepted whole or
/// not at all.
pub fn parse_drafts(completion: &str) -> Result<Vec<TaskDraft>, GenerationError> {
    let json = strip_code_fence(completion);

    let drafts: Vec<TaskDraft> = serde_json::from_str(json)
        .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

    if drafts.is_empty() || drafts.len() > MAX_DRAFTS {
        return Err(GenerationError::InvalidFormat(format!(
            "expected 1 to {MAX_DRAFTS} tasks, got {}",
            drafts.len()
        )));
    }

    for (index, draft) in drafts.iter().enumerate() {
        draft.check(index)?;
    }

    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn draft() -> Value {
        json!({
            "type": "multiple-choice",
            "difficulty": "easy",
            "points": 5,
            "timeEstimate": 60,
            "content": {
                "question": "Was ist 'der Hund'?",
                "options": ["the cat", "the dog", "the bird", "the fish"],
                "correctAnswer": "the dog",
                "hint": "It barks."
            }
        })
    }

    fn expect_invalid(value: Value) {
        let raw = serde_json::to_string(&value).unwrap();
        assert!(
            matches!(parse_drafts(&raw), Err(GenerationError::InvalidFormat(_))),
            "accepted {raw}"
        );
    }

    #[test]
    fn accepts_fenced_batch() {
        let raw = format!("```json\n{}\n```", json!([draft(), draft()]));
        let drafts = parse_drafts(&raw).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].content.correct_answer, "the dog");
    }

    #[test]
    fn rejects_wrong_option_count() {
        let mut bad = draft();
        bad["content"]["options"] = json!(["a", "b", "c"]);
        expect_invalid(json!([draft(), bad]));
    }

    #[test]
    fn rejects_values_outside_enumerations() {
        let mut bad = draft();
        bad["difficulty"] = json!("expert");
        expect_invalid(json!([bad]));

        let mut bad = draft();
        bad["points"] = json!(7);
        expect_invalid(json!([bad]));

        let mut bad = draft();
        bad["timeEstimate"] = json!(45);
        expect_invalid(json!([bad]));

        let mut bad = draft();
        bad["type"] = json!("essay");
        expect_invalid(json!([bad]));
    }

    #[test]
    fn rejects_answer_outside_options_and_duplicates() {
        let mut bad = draft();
        bad["content"]["correctAnswer"] = json!("the cow");
        expect_invalid(json!([bad]));

        let mut bad = draft();
        bad["content"]["options"] = json!(["a", "a", "b", "c"]);
        bad["content"]["correctAnswer"] = json!("a");
        expect_invalid(json!([bad]));
    }

    #[test]
    fn rejects_empty_and_oversized_batches() {
        expect_invalid(json!([]));
        expect_invalid(Value::Array(vec![draft(); MAX_DRAFTS + 1]));
        assert!(matches!(
            parse_drafts("Sure! Here are your questions."),
            Err(GenerationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn draft_converts_to_multiple_choice_task() {
        let raw = json!([draft()]).to_string();
        let task = parse_drafts(&raw).unwrap().remove(0).into_new_task();
        assert_eq!(task.task_type, MULTIPLE_CHOICE);
        assert_eq!(task.content.correct_answer(), Some("the dog"));
    }
}

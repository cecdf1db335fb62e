// src/generation/prompt.rs

use crate::generation::{ChapterSummary, MAX_DRAFTS};

pub fn system_prompt() -> String {
    format!(
        "You write A1-level German exercises for beginners.\n\
         \n\
         Produce {MAX_DRAFTS} multiple-choice questions for the chapter you are given.\n\
         - Test the chapter's grammar focus and vocabulary themes.\n\
         - Keep the German simple: short sentences, everyday words.\n\
         - Every question has exactly 4 options of similar length; one of them is the correct answer, verbatim.\n\
         - Hints are written in English.\n\
         - Mix difficulty: 4 easy (5 points, 60 seconds), 4 medium (10 points, 90 seconds), 2 hard (15 points, 120 seconds).\n\
         - Vary the question style: translation, verb forms and articles, word order, vocabulary in context."
    )
}

pub fn user_prompt(chapter: &ChapterSummary) -> String {
    let examples = if chapter.tasks.is_empty() {
        "No existing tasks".to_string()
    } else {
        let listed = serde_json::to_string_pretty(&chapter.tasks).unwrap_or_default();
        format!("Example tasks: {listed}")
    };

    format!(
        r#"Create {MAX_DRAFTS} new multiple-choice questions for this chapter.

Answer with a JSON array only, each element shaped like this:

{{
  "type": "multiple-choice",
  "difficulty": "easy" | "medium" | "hard",
  "points": 5 | 10 | 15,
  "timeEstimate": 60 | 90 | 120,
  "content": {{
    "question": "...",
    "options": ["...", "...", "...", "..."],
    "correctAnswer": "...",
    "hint": "..."
  }}
}}

Chapter:
Title: {title}
Description: {description}
Grammar Focus: {grammar}
Vocabulary Themes: {vocabulary}
{examples}
"#,
        title = chapter.title,
        description = chapter.description.as_deref().unwrap_or(""),
        grammar = chapter.grammar_focus.join(", "),
        vocabulary = chapter.vocabulary_themes.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_lists_chapter_fields() {
        let chapter = ChapterSummary {
            id: None,
            title: "Familie".into(),
            description: Some("Familienmitglieder".into()),
            grammar_focus: vec!["Possessivartikel".into(), "haben".into()],
            vocabulary_themes: vec!["Familie".into()],
            tasks: Vec::new(),
        };

        let prompt = user_prompt(&chapter);
        assert!(prompt.contains("Title: Familie"));
        assert!(prompt.contains("Grammar Focus: Possessivartikel, haben"));
        assert!(prompt.contains("No existing tasks"));
    }
}

// src/repository/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        chapter::{Chapter, ChapterWithTasks},
        task::{MULTIPLE_CHOICE, MultipleChoiceContent, NewTask, Task, TaskContent},
    },
    repository::ChapterRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEntry {
    pub correct: bool,
    pub attempts: u32,
}

/// Chapter repository held in process memory. Used when no database is
/// configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryChapterRepository {
    chapters: RwLock<Vec<ChapterWithTasks>>,
    progress: DashMap<(Uuid, Uuid), ProgressEntry>,
}

impl MemoryChapterRepository {
    pub fn new(chapters: Vec<ChapterWithTasks>) -> Self {
        Self {
            chapters: RwLock::new(chapters),
            progress: DashMap::new(),
        }
    }

    /// One beginner chapter with three multiple-choice tasks.
    pub fn demo() -> Self {
        let chapter_id = Uuid::new_v4();
        let tasks = [
            ("Wie heißt du? – Ich ___ Anna.", ["heiße", "heißt", "heißen", "heiß"], "heiße", "Verb ending for 'ich' is -e."),
            ("Was bedeutet 'der Apfel'?", ["the pear", "the apple", "the plum", "the grape"], "the apple", "A common fruit."),
            ("Woher kommst du? – Ich komme ___ Spanien.", ["aus", "von", "nach", "in"], "aus", "Origin from a country uses 'aus'."),
        ]
        .into_iter()
        .map(|(question, options, correct, hint)| {
            new_task_row(
                chapter_id,
                NewTask {
                    task_type: MULTIPLE_CHOICE.to_string(),
                    difficulty: "easy".to_string(),
                    points: 5,
                    time_estimate: 60,
                    content: TaskContent::MultipleChoice(MultipleChoiceContent {
                        question: question.to_string(),
                        options: options.map(String::from).to_vec(),
                        correct_answer: correct.to_string(),
                        hint: Some(hint.to_string()),
                    }),
                },
            )
        })
        .collect();

        Self::new(vec![ChapterWithTasks {
            chapter: Chapter {
                id: chapter_id,
                title: "Kapitel 1: Hallo!".to_string(),
                description: Some("Sich vorstellen, Herkunft, erste Wörter".to_string()),
                grammar_focus: vec!["Verbkonjugation Präsens".to_string(), "W-Fragen".to_string()],
                vocabulary_themes: vec!["Begrüßung".to_string(), "Länder".to_string()],
            },
            tasks,
        }])
    }

    pub fn progress(&self, user_id: Uuid, task_id: Uuid) -> Option<ProgressEntry> {
        self.progress.get(&(user_id, task_id)).map(|p| *p.value())
    }
}

fn new_task_row(chapter_id: Uuid, task: NewTask) -> Task {
    Task {
        id: Uuid::new_v4(),
        chapter_id,
        task_type: task.task_type,
        difficulty: task.difficulty,
        points: task.points,
        time_estimate: task.time_estimate,
        content: Json(task.content),
        created_at: Some(Utc::now()),
    }
}

#[async_trait]
impl ChapterRepository for MemoryChapterRepository {
    async fn list_chapters_with_tasks(&self) -> Result<Vec<ChapterWithTasks>, AppError> {
        Ok(self.chapters.read().await.clone())
    }

    async fn get_chapter(&self, id: Uuid) -> Result<Option<ChapterWithTasks>, AppError> {
        Ok(self
            .chapters
            .read()
            .await
            .iter()
            .find(|c| c.chapter.id == id)
            .cloned())
    }

    async fn save_tasks(&self, chapter_id: Uuid, tasks: Vec<NewTask>) -> Result<Vec<Task>, AppError> {
        let mut chapters = self.chapters.write().await;
        let chapter = chapters
            .iter_mut()
            .find(|c| c.chapter.id == chapter_id)
            .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

        let saved: Vec<Task> = tasks
            .into_iter()
            .map(|task| new_task_row(chapter_id, task))
            .collect();
        chapter.tasks.extend(saved.iter().cloned());

        tracing::info!("Saved {} tasks for chapter {}", saved.len(), chapter_id);
        Ok(saved)
    }

    async fn record_progress(&self, user_id: Uuid, task_id: Uuid, correct: bool) -> Result<(), AppError> {
        self.progress
            .entry((user_id, task_id))
            .and_modify(|p| {
                p.correct = correct;
                p.attempts += 1;
            })
            .or_insert(ProgressEntry {
                correct,
                attempts: 1,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saved_tasks_append_in_order() {
        let repo = MemoryChapterRepository::demo();
        let chapter_id = repo.list_chapters_with_tasks().await.unwrap()[0].chapter.id;

        let saved = repo
            .save_tasks(chapter_id, vec![demo_new_task("1"), demo_new_task("2")])
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);

        let chapter = repo.get_chapter(chapter_id).await.unwrap().unwrap();
        assert_eq!(chapter.tasks.len(), 5);
        assert_eq!(chapter.tasks[3].id, saved[0].id);
        assert_eq!(chapter.tasks[4].id, saved[1].id);
    }

    #[tokio::test]
    async fn save_to_unknown_chapter_fails() {
        let repo = MemoryChapterRepository::demo();
        let err = repo
            .save_tasks(Uuid::new_v4(), vec![demo_new_task("1")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn progress_counts_attempts() {
        let repo = MemoryChapterRepository::demo();
        let (user, task) = (Uuid::new_v4(), Uuid::new_v4());

        repo.record_progress(user, task, false).await.unwrap();
        repo.record_progress(user, task, true).await.unwrap();

        assert_eq!(
            repo.progress(user, task),
            Some(ProgressEntry {
                correct: true,
                attempts: 2
            })
        );
    }

    fn demo_new_task(tag: &str) -> NewTask {
        NewTask {
            task_type: MULTIPLE_CHOICE.to_string(),
            difficulty: "medium".to_string(),
            points: 10,
            time_estimate: 90,
            content: TaskContent::MultipleChoice(MultipleChoiceContent {
                question: format!("Frage {tag}"),
                options: ["a", "b", "c", "d"].map(String::from).to_vec(),
                correct_answer: "a".to_string(),
                hint: None,
            }),
        }
    }
}

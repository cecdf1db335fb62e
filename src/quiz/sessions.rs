// src/quiz/sessions.rs

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::models::task::Task;
use crate::quiz::engine::{AnswerOutcome, FinalScore, QuizEngine, QuizError, QuizState};

/// A quiz session owned by the server on behalf of one client.
#[derive(Debug)]
struct ActiveSession {
    chapter_id: Uuid,
    chapter_title: String,
    user_id: Option<Uuid>,
    engine: QuizEngine,
    last_touched: Instant,
}

/// A scored answer that may need to be persisted as user progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub correct: bool,
}

/// Question as shown to the player. Answer and hint stay hidden until scored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub chapter_id: Uuid,
    pub chapter_title: String,
    pub state: QuizState,
    pub repeating: bool,
    /// 1-based position within the current pass.
    pub question_number: usize,
    pub total: usize,
    pub score: usize,
    pub selected_option: Option<String>,
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FinalScore>,
}

/// In-process registry of quiz sessions, keyed by session id.
#[derive(Debug, Default)]
pub struct QuizSessions {
    sessions: DashMap<Uuid, ActiveSession>,
}

impl QuizSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Starts a session over `tasks` and registers it under a fresh id.
    pub fn create(
        &self,
        chapter_id: Uuid,
        chapter_title: String,
        user_id: Option<Uuid>,
        tasks: Vec<Task>,
    ) -> Result<SessionView, QuizError> {
        let mut engine = QuizEngine::new();
        engine.start(tasks)?;

        let id = Uuid::new_v4();
        let session = ActiveSession {
            chapter_id,
            chapter_title,
            user_id,
            engine,
            last_touched: Instant::now(),
        };
        let view = render(id, &session)?;
        self.sessions.insert(id, session);

        tracing::debug!(session_id = %id, chapter_id = %chapter_id, "quiz session started");
        Ok(view)
    }

    pub fn view(&self, id: Uuid) -> Result<SessionView, QuizError> {
        let mut session = self.sessions.get_mut(&id).ok_or(QuizError::NoActiveChapter)?;
        session.last_touched = Instant::now();
        render(id, &session)
    }

    /// Applies an answer. Returns the new view and, when the answer was scored
    /// for a known user, the progress entry to record.
    pub fn answer(
        &self,
        id: Uuid,
        option: &str,
    ) -> Result<(SessionView, Option<ScoredAnswer>), QuizError> {
        let mut session = self.sessions.get_mut(&id).ok_or(QuizError::NoActiveChapter)?;
        session.last_touched = Instant::now();

        let task_id = session
            .engine
            .session()
            .map(|s| s.current().id)
            .ok_or(QuizError::NoActiveChapter)?;
        let outcome = session.engine.select_answer(option)?;

        let scored = match (outcome.scored(), session.user_id) {
            (Some(correct), Some(user_id)) => Some(ScoredAnswer {
                user_id,
                task_id,
                correct,
            }),
            _ => None,
        };
        if outcome == AnswerOutcome::Ignored {
            tracing::debug!(session_id = %id, "repeated answer ignored");
        }

        Ok((render(id, &session)?, scored))
    }

    pub fn advance(&self, id: Uuid) -> Result<SessionView, QuizError> {
        let mut session = self.sessions.get_mut(&id).ok_or(QuizError::NoActiveChapter)?;
        session.last_touched = Instant::now();
        let step = session.engine.advance()?;
        tracing::debug!(session_id = %id, ?step, "quiz session advanced");
        render(id, &session)
    }

    /// Discards the session. Returns `false` if it did not exist.
    pub fn reset(&self, id: Uuid) -> bool {
        match self.sessions.remove(&id) {
            Some((_, mut session)) => {
                session.engine.reset();
                true
            }
            None => false,
        }
    }

    /// Drops sessions nobody has touched for longer than `ttl`.
    /// Returns how many were removed.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        self.sweep_idle_at(Instant::now(), ttl)
    }

    fn sweep_idle_at(&self, now: Instant, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.last_touched) <= ttl);
        before.saturating_sub(self.sessions.len())
    }
}

/// Periodically sweeps idle sessions. Runs until the task is aborted.
pub async fn run_idle_sweeper(sessions: std::sync::Arc<QuizSessions>, ttl: Duration) {
    let mut interval = tokio::time::interval(ttl.min(Duration::from_secs(60)));
    // Skip the first immediate tick.
    interval.tick().await;

    loop {
        interval.tick().await;
        let removed = sessions.sweep_idle(ttl);
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "idle quiz sessions swept");
        }
    }
}

fn render(id: Uuid, active: &ActiveSession) -> Result<SessionView, QuizError> {
    let session = active.engine.session().ok_or(QuizError::NoActiveChapter)?;
    let current = session.current();
    let answered = session.is_answered();

    let question = current.multiple_choice().map(|mc| QuestionView {
        id: current.id,
        question: mc.question.clone(),
        options: mc.options.clone(),
        hint: answered.then(|| mc.hint.clone()).flatten(),
        correct_answer: answered.then(|| mc.correct_answer.clone()),
    });

    Ok(SessionView {
        session_id: id,
        chapter_id: active.chapter_id,
        chapter_title: active.chapter_title.clone(),
        state: session.state(),
        repeating: session.is_repeating(),
        question_number: session.cursor() + 1,
        total: session.active_queue().len(),
        score: session.score(),
        selected_option: session.selected_option().map(str::to_string),
        question,
        result: session.is_complete().then(|| session.final_score()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::multiple_choice_task;

    #[test]
    fn hint_and_answer_hidden_until_answered() {
        let sessions = QuizSessions::new();
        let view = sessions
            .create(Uuid::nil(), "Kapitel 1".into(), None, vec![multiple_choice_task("C")])
            .unwrap();

        let question = view.question.as_ref().unwrap();
        assert!(question.hint.is_none());
        assert!(question.correct_answer.is_none());
        assert_eq!(view.state, QuizState::InProgress);

        let (view, scored) = sessions.answer(view.session_id, "C").unwrap();
        let question = view.question.as_ref().unwrap();
        assert_eq!(question.correct_answer.as_deref(), Some("C"));
        assert!(question.hint.is_some());
        assert_eq!(view.score, 1);
        assert!(scored.is_none(), "anonymous sessions record no progress");
    }

    #[test]
    fn scored_answers_carry_user() {
        let sessions = QuizSessions::new();
        let user = Uuid::new_v4();
        let task = multiple_choice_task("A");
        let view = sessions
            .create(Uuid::nil(), "Kapitel 2".into(), Some(user), vec![task.clone()])
            .unwrap();

        let (_, scored) = sessions.answer(view.session_id, "B").unwrap();
        assert_eq!(
            scored,
            Some(ScoredAnswer {
                user_id: user,
                task_id: task.id,
                correct: false
            })
        );

        let (_, repeat) = sessions.answer(view.session_id, "A").unwrap();
        assert!(repeat.is_none());
    }

    #[test]
    fn unknown_and_reset_sessions_are_gone() {
        let sessions = QuizSessions::new();
        assert_eq!(sessions.view(Uuid::new_v4()).unwrap_err(), QuizError::NoActiveChapter);

        let view = sessions
            .create(Uuid::nil(), "Kapitel 3".into(), None, vec![multiple_choice_task("A")])
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions.reset(view.session_id));
        assert!(!sessions.reset(view.session_id));
        assert!(sessions.is_empty());
        assert_eq!(
            sessions.advance(view.session_id).unwrap_err(),
            QuizError::NoActiveChapter
        );
    }

    #[test]
    fn idle_sessions_are_swept() {
        let sessions = QuizSessions::new();
        let ttl = Duration::from_secs(60);
        let finished = sessions
            .create(Uuid::nil(), "Kapitel 5".into(), None, vec![multiple_choice_task("A")])
            .unwrap();
        sessions.answer(finished.session_id, "A").unwrap();
        sessions.advance(finished.session_id).unwrap();
        sessions
            .create(Uuid::nil(), "Kapitel 6".into(), None, vec![multiple_choice_task("B")])
            .unwrap();
        assert_eq!(sessions.len(), 2);

        assert_eq!(sessions.sweep_idle(ttl), 0);
        assert_eq!(sessions.len(), 2);

        let later = Instant::now() + ttl + Duration::from_secs(1);
        assert_eq!(sessions.sweep_idle_at(later, ttl), 2);
        assert!(sessions.is_empty());
        assert_eq!(
            sessions.view(finished.session_id).unwrap_err(),
            QuizError::NoActiveChapter
        );
    }

    #[test]
    fn touching_a_session_keeps_it_alive() {
        let sessions = QuizSessions::new();
        let ttl = Duration::from_secs(60);
        let view = sessions
            .create(Uuid::nil(), "Kapitel 7".into(), None, vec![multiple_choice_task("C")])
            .unwrap();

        let cutoff = Instant::now() + Duration::from_secs(30);
        sessions.view(view.session_id).unwrap();
        assert_eq!(sessions.sweep_idle_at(cutoff, ttl), 0);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn completion_exposes_result() {
        let sessions = QuizSessions::new();
        let view = sessions
            .create(Uuid::nil(), "Kapitel 4".into(), None, vec![multiple_choice_task("D")])
            .unwrap();
        sessions.answer(view.session_id, "D").unwrap();

        let view = sessions.advance(view.session_id).unwrap();
        assert_eq!(view.state, QuizState::Complete);
        assert_eq!(view.result, Some(FinalScore { score: 1, total: 1 }));
    }
}

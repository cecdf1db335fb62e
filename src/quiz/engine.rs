// src/quiz/engine.rs

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::models::task::Task;

/// Caller-flow violations. The engine never recovers from these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// `start` was called with no questions.
    EmptyChapter,
    /// `advance` was called before the current question was answered.
    NotAnswered,
    /// No chapter is active (never started, or reset).
    NoActiveChapter,
    /// The session already finished; only `reset` is allowed.
    AlreadyComplete,
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::EmptyChapter => write!(f, "chapter has no questions"),
            QuizError::NotAnswered => write!(f, "current question has not been answered"),
            QuizError::NoActiveChapter => write!(f, "no active quiz session"),
            QuizError::AlreadyComplete => write!(f, "quiz session is already complete"),
        }
    }
}

impl std::error::Error for QuizError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Idle,
    InProgress,
    AwaitingAdvance,
    Complete,
}

/// Result of `select_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The question was already answered; nothing changed.
    Ignored,
}

impl AnswerOutcome {
    /// `Some(correct)` when the answer was scored.
    pub fn scored(self) -> Option<bool> {
        match self {
            AnswerOutcome::Correct => Some(true),
            AnswerOutcome::Incorrect => Some(false),
            AnswerOutcome::Ignored => None,
        }
    }
}

/// Score of the pass that just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalScore {
    pub score: usize,
    pub total: usize,
}

/// Where `advance` moved the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Remediation,
    Complete(FinalScore),
}

/// One chapter's quiz, from `start` until completion.
#[derive(Debug, Clone)]
pub struct QuizSession {
    /// The chapter's questions as given to `start`; remediation order comes from here.
    chapter: Vec<Task>,
    active_queue: Vec<Task>,
    cursor: usize,
    score: usize,
    missed: HashSet<Uuid>,
    selected_option: Option<String>,
    answered: bool,
    repeating: bool,
    complete: bool,
}

impl QuizSession {
    pub fn start(questions: Vec<Task>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyChapter);
        }

        Ok(Self {
            active_queue: questions.clone(),
            chapter: questions,
            cursor: 0,
            score: 0,
            missed: HashSet::new(),
            selected_option: None,
            answered: false,
            repeating: false,
            complete: false,
        })
    }

    /// Scores `option` against the current question. Only the first call per
    /// question counts.
    pub fn select_answer(&mut self, option: &str) -> AnswerOutcome {
        if self.answered {
            return AnswerOutcome::Ignored;
        }

        self.selected_option = Some(option.to_string());
        self.answered = true;

        let current = &self.active_queue[self.cursor];
        if current.content.correct_answer() == Some(option) {
            self.score += 1;
            AnswerOutcome::Correct
        } else {
            self.missed.insert(current.id);
            AnswerOutcome::Incorrect
        }
    }

    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        if self.complete {
            return Err(QuizError::AlreadyComplete);
        }
        if !self.answered {
            return Err(QuizError::NotAnswered);
        }

        if self.cursor + 1 < self.active_queue.len() {
            self.cursor += 1;
            self.answered = false;
            self.selected_option = None;
            return Ok(Advance::Next);
        }

        if !self.repeating && !self.missed.is_empty() {
            self.active_queue = self
                .chapter
                .iter()
                .filter(|q| self.missed.contains(&q.id))
                .cloned()
                .collect();
            self.cursor = 0;
            self.score = 0;
            self.missed.clear();
            self.repeating = true;
            self.answered = false;
            self.selected_option = None;
            return Ok(Advance::Remediation);
        }

        self.complete = true;
        Ok(Advance::Complete(self.final_score()))
    }

    pub fn state(&self) -> QuizState {
        if self.complete {
            QuizState::Complete
        } else if self.answered {
            QuizState::AwaitingAdvance
        } else {
            QuizState::InProgress
        }
    }

    pub fn current(&self) -> &Task {
        &self.active_queue[self.cursor]
    }

    pub fn active_queue(&self) -> &[Task] {
        &self.active_queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn missed(&self) -> &HashSet<Uuid> {
        &self.missed
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Score and length of the current (or just finished) pass.
    pub fn final_score(&self) -> FinalScore {
        FinalScore {
            score: self.score,
            total: self.active_queue.len(),
        }
    }
}

/// Holds at most one active session. `Idle` when none.
#[derive(Debug, Default)]
pub struct QuizEngine {
    session: Option<QuizSession>,
}

impl QuizEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new session, discarding any previous one.
    pub fn start(&mut self, questions: Vec<Task>) -> Result<(), QuizError> {
        self.session = Some(QuizSession::start(questions)?);
        Ok(())
    }

    pub fn select_answer(&mut self, option: &str) -> Result<AnswerOutcome, QuizError> {
        self.session
            .as_mut()
            .map(|s| s.select_answer(option))
            .ok_or(QuizError::NoActiveChapter)
    }

    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        self.session
            .as_mut()
            .ok_or(QuizError::NoActiveChapter)?
            .advance()
    }

    pub fn reset(&mut self) {
        self.session = None;
    }

    pub fn state(&self) -> QuizState {
        self.session
            .as_ref()
            .map_or(QuizState::Idle, QuizSession::state)
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }
}

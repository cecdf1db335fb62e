// src/quiz/mod.rs

//! Chapter quiz progression: one scored pass over a chapter's questions,
//! followed by at most one remediation pass over the ones that were missed.

pub mod engine;
pub mod sessions;

pub use engine::{Advance, AnswerOutcome, FinalScore, QuizEngine, QuizError, QuizSession, QuizState};
pub use sessions::{QuizSessions, SessionView, run_idle_sweeper};

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::generation::TaskGenerator;
use crate::quiz::QuizSessions;
use crate::repository::ChapterRepository;
use crate::tenant::TenantStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chapters: Arc<dyn ChapterRepository>,
    pub tenants: Arc<dyn TenantStore>,
    pub generator: Arc<dyn TaskGenerator>,
    pub sessions: Arc<QuizSessions>,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ChapterRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.chapters.clone()
    }
}

impl FromRef<AppState> for Arc<QuizSessions> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

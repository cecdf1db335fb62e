// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

pub const DEFAULT_ROOT_DOMAIN: &str = "atlanov.me";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_QUIZ_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs on the in-memory stores.
    pub database_url: Option<String>,
    pub root_domain: String,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub log_dir: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
    /// Idle time after which a quiz session is dropped.
    pub quiz_session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let root_domain = env::var("ROOT_DOMAIN")
            .map(|v| v.trim().to_lowercase())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOT_DOMAIN.to_string());

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| match v.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!("Ignoring invalid BIND_ADDR {:?}: {}", v, e);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty());

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());

        let openai_api_url = env::var("OPENAI_API_URL")
            .map(|v| checked_api_url(&v))
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string());

        let quiz_session_ttl = env::var("QUIZ_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_QUIZ_SESSION_TTL);

        Self {
            database_url,
            root_domain,
            bind_addr,
            rust_log,
            log_dir,
            openai_api_key,
            openai_model,
            openai_api_url,
            quiz_session_ttl,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            root_domain: DEFAULT_ROOT_DOMAIN.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            quiz_session_ttl: DEFAULT_QUIZ_SESSION_TTL,
        }
    }
}

/// Keeps `raw` only if it is an absolute http(s) URL.
fn checked_api_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => {
            tracing::warn!("Ignoring invalid OPENAI_API_URL {:?}, using default", raw);
            DEFAULT_OPENAI_API_URL.to_string()
        }
    }
}

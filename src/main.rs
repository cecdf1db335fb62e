// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use atlanov::config::Config;
use atlanov::generation::{OpenAiGenerator, TaskGenerator};
use atlanov::quiz::{QuizSessions, run_idle_sweeper};
use atlanov::repository::{ChapterRepository, MemoryChapterRepository, PgChapterRepository};
use atlanov::routes;
use atlanov::state::AppState;
use atlanov::tenant::{MemoryTenantStore, PgTenantStore, TenantStore};
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DB_CONNECT_RETRIES: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let (chapters, tenants): (Arc<dyn ChapterRepository>, Arc<dyn TenantStore>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = connect_with_retry(database_url).await?;
                tracing::info!("Database connected...");

                // Run Migrations Automatically
                tracing::info!("Running migrations...");
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Migrations applied successfully.");

                let chapters: Arc<dyn ChapterRepository> =
                    Arc::new(PgChapterRepository::new(pool.clone()));
                let tenants: Arc<dyn TenantStore> = Arc::new(PgTenantStore::new(pool));
                (chapters, tenants)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, serving in-memory demo data");
                let chapters: Arc<dyn ChapterRepository> = Arc::new(MemoryChapterRepository::demo());
                let tenants: Arc<dyn TenantStore> = Arc::new(MemoryTenantStore::with_demo_tenants());
                (chapters, tenants)
            }
        };

    let generator = OpenAiGenerator::new(&config)?;
    if !generator.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set, task generation is disabled");
    }
    let generator: Arc<dyn TaskGenerator> = Arc::new(generator);

    let sessions = Arc::new(QuizSessions::new());
    tokio::spawn(run_idle_sweeper(sessions.clone(), config.quiz_session_ttl));
    tracing::info!(
        ttl_secs = config.quiz_session_ttl.as_secs(),
        "quiz session sweeper started"
    );

    // Create AppState
    let state = AppState {
        config: config.clone(),
        chapters,
        tenants,
        generator,
        sessions,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {} (root domain {})", config.bind_addr, config.root_domain);

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

/// Connects to Postgres, retrying while the database comes up.
async fn connect_with_retry(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) if retry_count >= DB_CONNECT_RETRIES => {
                tracing::error!("Failed to connect to database after {} retries", retry_count);
                return Err(e);
            }
            Err(e) => {
                retry_count += 1;
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {}): {}",
                    retry_count,
                    e
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

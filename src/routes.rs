// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, request::Parts},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::{
    handlers::{chapters, pages, quiz, tasks, tenants},
    state::AppState,
    tenant::middleware::tenant_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (api, quiz, pages).
/// * Applies global middleware (Trace, CORS).
/// * Wraps everything in tenant routing, which must see requests before
///   route matching so internal rewrites are routed to their target.
pub fn create_router(state: AppState) -> Router {
    let root_domain = state.config.root_domain.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &Parts| is_own_origin(origin, &root_domain),
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/sessions", post(quiz::start_session))
        .route("/sessions/{id}", get(quiz::get_session).delete(quiz::reset))
        .route("/sessions/{id}/answer", post(quiz::answer))
        .route("/sessions/{id}/advance", post(quiz::advance));

    let api_routes = Router::new()
        .route("/chapters", get(chapters::list_chapters))
        .route("/chapters/{id}", get(chapters::get_chapter))
        .route("/generate-tasks", post(tasks::generate_tasks))
        .route("/save-tasks", post(tasks::save_tasks))
        .route(
            "/tenants",
            get(tenants::list_tenants).post(tenants::create_tenant),
        )
        .nest("/quiz", quiz_routes);

    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/decision", get(pages::decision))
        .route("/s/{subdomain}", get(pages::tenant_landing));

    let app = Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .fallback(pages::not_found)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    Router::new()
        .fallback_service(app)
        .layer(middleware::from_fn_with_state(state, tenant_middleware))
}

/// Accepts the root domain and any of its subdomains, over http or https.
fn is_own_origin(origin: &HeaderValue, root_domain: &str) -> bool {
    let Some(host) = origin
        .to_str()
        .ok()
        .and_then(|o| Url::parse(o).ok())
        .and_then(|u| u.host_str().map(str::to_string))
    else {
        return false;
    };

    host == root_domain || host.ends_with(&format!(".{root_domain}"))
}

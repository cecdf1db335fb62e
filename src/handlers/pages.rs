// src/handlers/pages.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::AppError,
    state::AppState,
    tenant::lookup_tenant,
    utils::html::{escape, layout},
};

/// The not-found page, served for unknown tenants and unknown paths.
pub fn not_found_page() -> Response {
    let body = r#"<h1>404</h1>
<h2>Page Not Found</h2>
<p>The page you are looking for doesn't exist or has been moved.</p>
<p><a href="/">Go Home</a></p>"#;

    (StatusCode::NOT_FOUND, Html(layout("Page Not Found", body))).into_response()
}

/// Router fallback.
pub async fn not_found() -> Response {
    not_found_page()
}

/// Root landing page. Lists the known tenants.
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let root = &state.config.root_domain;
    let tenants = state.tenants.list().await?;

    let items: String = tenants
        .iter()
        .map(|t| {
            let key = escape(&t.key);
            format!(
                "<li>{emoji} <a href=\"https://{key}.{root}\">{key}.{root}</a></li>\n",
                emoji = escape(&t.emoji),
                root = escape(root),
            )
        })
        .collect();

    let body = format!(
        "<h1>{root}</h1>\n<p>German A1 quizzes, chapter by chapter.</p>\n<ul>\n{items}</ul>",
        root = escape(root),
    );

    Ok(Html(layout(root, &body)))
}

/// Landing page of a single tenant, reached through the tenant rewrite.
pub async fn tenant_landing(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Response, AppError> {
    let Some(tenant) = lookup_tenant(state.tenants.as_ref(), &subdomain).await? else {
        return Ok(not_found_page());
    };

    let root = escape(&state.config.root_domain);
    let key = escape(&tenant.key);
    let body = format!(
        r#"<div class="icon">{emoji}</div>
<h1>Welcome to {key}.{root}</h1>
<p>This is your custom subdomain page.</p>
<p><a href="https://{root}">Go to Main Site</a> <a href="/dashboard">View Dashboard</a></p>"#,
        emoji = escape(&tenant.emoji),
    );

    let title = format!("{}.{}", tenant.key, state.config.root_domain);
    Ok(Html(layout(&title, &body)).into_response())
}

/// Target of the reserved `decision` subdomain.
pub async fn decision() -> Html<String> {
    let body = r#"<h1>Decision</h1>
<p>Pick a chapter and start practising.</p>
<p><a href="/api/chapters">Browse chapters</a></p>"#;

    Html(layout("Decision", body))
}

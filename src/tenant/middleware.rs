// src/tenant/middleware.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri, header, uri::PathAndQuery},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    handlers::pages,
    state::AppState,
    tenant::resolver::{RoutingDecision, extract_label, resolve},
};

/// Axum Middleware: Tenant Routing.
///
/// Runs before route matching. Classifies the request by its `Host` and
/// either lets it through, rewrites its path to an internal page, or answers
/// with the not-found page.
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| req.uri().host())
        .unwrap_or_default()
        .to_string();

    let label = extract_label(&host, &state.config.root_domain);
    let path = req.uri().path().to_string();

    let decision = match resolve(state.tenants.as_ref(), label.as_deref(), &path).await {
        Ok(decision) => decision,
        Err(e) => return e.into_response(),
    };

    match decision {
        RoutingDecision::PassThrough => next.run(req).await,
        RoutingDecision::InternalRewrite(target) => {
            match rewrite_path(req.uri(), &target) {
                Ok(uri) => {
                    tracing::debug!(host = %host, from = %path, to = %target, "tenant rewrite");
                    *req.uri_mut() = uri;
                    next.run(req).await
                }
                Err(e) => e.into_response(),
            }
        }
        RoutingDecision::NotFound => {
            tracing::debug!(host = %host, "unknown tenant");
            pages::not_found_page()
        }
    }
}

/// Replaces the path of `uri` with `target`, keeping the query string.
fn rewrite_path(uri: &Uri, target: &str) -> Result<Uri, AppError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{target}?{query}"),
        None => target.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?,
    );

    Uri::from_parts(parts).map_err(|e| AppError::InternalServerError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_keeps_query() {
        let uri: Uri = "/?ref=mail".parse().unwrap();
        assert_eq!(rewrite_path(&uri, "/s/tenant-x").unwrap(), "/s/tenant-x?ref=mail");

        let uri: Uri = "http://tenant-x.atlanov.me/".parse().unwrap();
        let rewritten = rewrite_path(&uri, "/s/tenant-x").unwrap();
        assert_eq!(rewritten.path(), "/s/tenant-x");
        assert_eq!(rewritten.host(), Some("tenant-x.atlanov.me"));
    }
}

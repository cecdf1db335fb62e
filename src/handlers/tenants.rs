// src/handlers/tenants.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::tenant::{CreateTenantRequest, TenantRecord},
    state::AppState,
    tenant::{normalize_label, resolver::is_reserved},
};

/// Lists all tenants.
pub async fn list_tenants(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tenants = state.tenants.list().await?;
    Ok(Json(tenants))
}

/// Registers a new tenant subdomain.
///
/// * Normalizes the subdomain the same way lookups do.
/// * Rejects invalid icons and reserved labels.
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let key = normalize_label(&payload.subdomain);
    if key.is_empty() {
        return Err(AppError::BadRequest(
            "Subdomain must contain letters, digits, '.' or '-'".to_string(),
        ));
    }
    if is_reserved(&key) {
        return Err(AppError::Conflict(format!("Subdomain '{key}' is reserved")));
    }

    let record = TenantRecord {
        key,
        emoji: payload.emoji,
        created_at: Utc::now(),
    };
    state.tenants.insert(record.clone()).await?;
    tracing::info!("Created tenant {}", record.key);

    Ok((StatusCode::CREATED, Json(record)))
}

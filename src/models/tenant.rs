// src/models/tenant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::tenant::icon::validate_icon;

/// Represents the 'tenants' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    /// Normalized subdomain label.
    #[sqlx(rename = "subdomain")]
    #[serde(rename = "subdomain")]
    pub key: String,

    pub emoji: String,

    /// Informational only. Serialized as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new tenant.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 63))]
    pub subdomain: String,
    #[validate(custom(function = validate_icon_field))]
    pub emoji: String,
}

fn validate_icon_field(emoji: &str) -> Result<(), validator::ValidationError> {
    if !validate_icon(emoji) {
        return Err(validator::ValidationError::new("invalid_icon"));
    }
    Ok(())
}

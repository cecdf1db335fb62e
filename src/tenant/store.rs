// src/tenant/store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use sqlx::PgPool;

use crate::{error::AppError, models::tenant::TenantRecord};

/// Lowercases `label` and drops everything outside `[a-z0-9.-]`.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
        .collect()
}

/// Backing store for tenant records. Keys passed in are already normalized.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find(&self, key: &str) -> Result<Option<TenantRecord>, AppError>;

    /// All tenants ordered by key.
    async fn list(&self) -> Result<Vec<TenantRecord>, AppError>;

    /// Fails with `AppError::Conflict` if the key is taken.
    async fn insert(&self, record: TenantRecord) -> Result<(), AppError>;
}

/// Finds the tenant addressed by a raw subdomain label.
///
/// A missing tenant is `Ok(None)`, never an error.
pub async fn lookup_tenant(
    store: &dyn TenantStore,
    label: &str,
) -> Result<Option<TenantRecord>, AppError> {
    let key = normalize_label(label);
    if key.is_empty() {
        return Ok(None);
    }
    store.find(&key).await
}

/// In-process tenant store.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    tenants: DashMap<String, TenantRecord>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the two demo tenants.
    pub fn with_demo_tenants() -> Self {
        let store = Self::new();
        for (key, emoji, created_ms) in [
            ("tenant-x", "🌟", 1_716_200_000_000),
            ("tenant-y", "🚀", 1_716_300_000_000),
        ] {
            store.tenants.insert(
                key.to_string(),
                TenantRecord {
                    key: key.to_string(),
                    emoji: emoji.to_string(),
                    created_at: DateTime::<Utc>::from_timestamp_millis(created_ms)
                        .unwrap_or_default(),
                },
            );
        }
        store
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn find(&self, key: &str) -> Result<Option<TenantRecord>, AppError> {
        Ok(self.tenants.get(key).map(|t| t.value().clone()))
    }

    async fn list(&self) -> Result<Vec<TenantRecord>, AppError> {
        let mut all: Vec<TenantRecord> = self.tenants.iter().map(|t| t.value().clone()).collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(all)
    }

    async fn insert(&self, record: TenantRecord) -> Result<(), AppError> {
        match self.tenants.entry(record.key.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Subdomain '{}' already exists",
                record.key
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }
}

/// Tenant store over the 'tenants' table.
#[derive(Debug, Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find(&self, key: &str) -> Result<Option<TenantRecord>, AppError> {
        let tenant = sqlx::query_as::<_, TenantRecord>(
            "SELECT subdomain, emoji, created_at FROM tenants WHERE subdomain = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up tenant {}: {:?}", key, e);
            AppError::from(e)
        })?;

        Ok(tenant)
    }

    async fn list(&self) -> Result<Vec<TenantRecord>, AppError> {
        let tenants = sqlx::query_as::<_, TenantRecord>(
            "SELECT subdomain, emoji, created_at FROM tenants ORDER BY subdomain",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn insert(&self, record: TenantRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tenants (subdomain, emoji, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (subdomain) DO NOTHING
            "#,
        )
        .bind(&record.key)
        .bind(&record.emoji)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Subdomain '{}' already exists",
                record.key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_foreign_characters() {
        assert_eq!(normalize_label("Tenant-X!!"), "tenant-x");
        assert_eq!(normalize_label("a_b c.d"), "abc.d");
        assert_eq!(normalize_label("ÄÖÜ"), "");
    }

    #[tokio::test]
    async fn lookup_normalizes_before_querying() {
        let store = MemoryTenantStore::with_demo_tenants();

        let raw = lookup_tenant(&store, "Tenant-X!!").await.unwrap();
        let clean = lookup_tenant(&store, "tenant-x").await.unwrap();
        assert!(raw.is_some());
        assert_eq!(raw, clean);
        assert_eq!(raw.unwrap().emoji, "🌟");
    }

    #[tokio::test]
    async fn missing_tenant_is_none() {
        let store = MemoryTenantStore::with_demo_tenants();
        assert!(lookup_tenant(&store, "unknown-sub").await.unwrap().is_none());
        assert!(lookup_tenant(&store, "!!!").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryTenantStore::with_demo_tenants();
        let record = TenantRecord {
            key: "tenant-x".into(),
            emoji: "🎉".into(),
            created_at: Utc::now(),
        };
        assert!(matches!(store.insert(record).await, Err(AppError::Conflict(_))));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}

// src/tenant/resolver.rs

use crate::error::AppError;
use crate::tenant::store::{TenantStore, lookup_tenant, normalize_label};

/// What to do with an inbound request, decided from its host and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Continue with the request unchanged.
    PassThrough,
    /// Serve the given internal path under the original URL.
    InternalRewrite(String),
    /// Serve the not-found page.
    NotFound,
}

/// Subdomain labels with fixed routing that never consult the tenant store.
const RESERVED_LABELS: &[(&str, Option<&str>)] = &[
    // Always passes through to the root site.
    ("flashcards", None),
    ("decision", Some("/decision")),
];

/// Returns the subdomain label of `host` under `root_domain`.
///
/// Root traffic (`root` or `www.root`) and hosts outside the root domain
/// both yield `None`.
pub fn extract_label(host: &str, root_domain: &str) -> Option<String> {
    let hostname = strip_port(host.trim()).to_ascii_lowercase();
    let root = root_domain.to_ascii_lowercase();

    if hostname == root || hostname == format!("www.{root}") {
        return None;
    }

    hostname
        .strip_suffix(&format!(".{root}"))
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (name.ends_with(']') || !name.contains(':')) =>
        {
            name
        }
        _ => host,
    }
}

/// Fixed decision for a reserved label, if `label` is one.
///
/// Compared after the same normalization tenant lookups use.
pub fn reserved_route(label: &str) -> Option<RoutingDecision> {
    let key = normalize_label(label);
    RESERVED_LABELS
        .iter()
        .find(|(reserved, _)| *reserved == key)
        .map(|(_, target)| match target {
            Some(path) => RoutingDecision::InternalRewrite((*path).to_string()),
            None => RoutingDecision::PassThrough,
        })
}

pub fn is_reserved(label: &str) -> bool {
    reserved_route(label).is_some()
}

/// Internal path serving a tenant's landing page.
pub fn tenant_landing_path(key: &str) -> String {
    format!("/s/{key}")
}

/// Classifies a request addressed to `label` (if any) at `request_path`.
///
/// Only the tenant lookup can fail, and only when the store itself fails.
pub async fn resolve(
    store: &dyn TenantStore,
    label: Option<&str>,
    request_path: &str,
) -> Result<RoutingDecision, AppError> {
    let Some(label) = label else {
        return Ok(RoutingDecision::PassThrough);
    };

    if let Some(decision) = reserved_route(label) {
        return Ok(decision);
    }

    let decision = match lookup_tenant(store, label).await? {
        None => RoutingDecision::NotFound,
        Some(tenant) if request_path == "/" => {
            RoutingDecision::InternalRewrite(tenant_landing_path(&tenant.key))
        }
        // Sub-paths on a tenant host are already addressed; don't rewrite twice.
        Some(_) => RoutingDecision::PassThrough,
    };

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::store::MemoryTenantStore;

    const ROOT: &str = "atlanov.me";

    #[test]
    fn extracts_subdomain_label() {
        assert_eq!(
            extract_label("tenant-x.atlanov.me:3000", ROOT).as_deref(),
            Some("tenant-x")
        );
        assert_eq!(extract_label("a.b.atlanov.me", ROOT).as_deref(), Some("a.b"));
        assert_eq!(extract_label("Tenant-X.Atlanov.me", ROOT).as_deref(), Some("tenant-x"));
    }

    #[test]
    fn root_and_foreign_hosts_have_no_label() {
        assert_eq!(extract_label("atlanov.me", ROOT), None);
        assert_eq!(extract_label("atlanov.me:443", ROOT), None);
        assert_eq!(extract_label("www.atlanov.me", ROOT), None);
        assert_eq!(extract_label("other.com", ROOT), None);
        assert_eq!(extract_label("evilatlanov.me", ROOT), None);
        assert_eq!(extract_label(".atlanov.me", ROOT), None);
        assert_eq!(extract_label("", ROOT), None);
    }

    #[test]
    fn port_stripping_leaves_ipv6_intact() {
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
        assert_eq!(strip_port("localhost:"), "localhost:");
    }

    #[tokio::test]
    async fn known_tenant_root_is_rewritten() {
        let store = MemoryTenantStore::with_demo_tenants();
        assert_eq!(
            resolve(&store, Some("tenant-x"), "/").await.unwrap(),
            RoutingDecision::InternalRewrite("/s/tenant-x".into())
        );
        assert_eq!(
            resolve(&store, Some("tenant-x"), "/dashboard").await.unwrap(),
            RoutingDecision::PassThrough
        );
    }

    #[tokio::test]
    async fn unknown_tenant_is_not_found() {
        let store = MemoryTenantStore::with_demo_tenants();
        assert_eq!(
            resolve(&store, Some("unknown-sub"), "/").await.unwrap(),
            RoutingDecision::NotFound
        );
        assert_eq!(
            resolve(&store, Some("unknown-sub"), "/api/chapters").await.unwrap(),
            RoutingDecision::NotFound
        );
    }

    #[tokio::test]
    async fn reserved_labels_skip_lookup() {
        let store = MemoryTenantStore::new();
        assert_eq!(
            resolve(&store, Some("flashcards"), "/").await.unwrap(),
            RoutingDecision::PassThrough
        );
        assert_eq!(
            resolve(&store, Some("decision"), "/anything").await.unwrap(),
            RoutingDecision::InternalRewrite("/decision".into())
        );
        assert_eq!(
            resolve(&store, None, "/").await.unwrap(),
            RoutingDecision::PassThrough
        );
    }

    #[tokio::test]
    async fn reserved_labels_match_after_normalization() {
        let store = MemoryTenantStore::new();
        assert_eq!(
            resolve(&store, Some("decision_"), "/").await.unwrap(),
            RoutingDecision::InternalRewrite("/decision".into())
        );
        assert_eq!(
            resolve(&store, Some("Flash_Cards"), "/").await.unwrap(),
            RoutingDecision::PassThrough
        );
        assert!(is_reserved("DECISION!"));
        assert!(!is_reserved("decisions"));
    }
}

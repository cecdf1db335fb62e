// src/tenant/mod.rs

//! Subdomain-based tenant routing: host parsing, tenant lookup and the
//! request-level routing decision.

pub mod icon;
pub mod middleware;
pub mod resolver;
pub mod store;

pub use resolver::{RoutingDecision, extract_label, resolve};
pub use store::{MemoryTenantStore, PgTenantStore, TenantStore, lookup_tenant, normalize_label};

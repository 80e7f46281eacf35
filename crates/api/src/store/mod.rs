//! Tenant and content store boundary
//!
//! The storage engine is an external collaborator; the router and the
//! provisioning workflow only see these traits. Two backends ship with the
//! server:
//! - [`postgres`]: durable, uniqueness enforced by a `UNIQUE (subdomain)` constraint
//! - [`memory`]: process-local, for development and tests

use std::sync::Arc;

use async_trait::async_trait;
use subsite_shared::{db, Page, StoreError, StoreResult, Tenant, TenantId, TenantStatus};
use tracing::{info, warn};

use crate::config::Config;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryContentStore, MemoryTenantStore};
pub use postgres::{PgContentStore, PgTenantStore};

/// Tenant and content store handles for the configured backend
pub struct Stores {
    pub tenants: Arc<dyn TenantStore>,
    pub content: Arc<dyn ContentStore>,
}

/// Connect to Postgres (running migrations) when `DATABASE_URL` is set,
/// otherwise fall back to in-memory stores.
pub async fn connect(config: &Config) -> StoreResult<Stores> {
    match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.database_max_connections).await?;
            db::run_migrations(&pool)
                .await
                .map_err(|e| StoreError::Database(format!("migration failed: {}", e)))?;
            info!(max_connections = config.database_max_connections, "Connected to Postgres");
            Ok(Stores {
                tenants: Arc::new(PgTenantStore::new(pool.clone())),
                content: Arc::new(PgContentStore::new(pool)),
            })
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory stores (data is lost on restart)");
            Ok(Stores {
                tenants: Arc::new(MemoryTenantStore::new()),
                content: Arc::new(MemoryContentStore::new()),
            })
        }
    }
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Look up a tenant by its (lowercase) subdomain
    async fn find_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<Tenant>>;

    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>>;

    /// Persist a new `Pending` tenant
    ///
    /// Must return `StoreError::Conflict` when another tenant already holds
    /// the subdomain, including when two inserts race.
    async fn insert_pending(&self, tenant: Tenant) -> StoreResult<Tenant>;

    async fn update_status(&self, id: TenantId, status: TenantStatus) -> StoreResult<Tenant>;

    async fn list_active_subdomains(&self) -> StoreResult<Vec<String>>;

    /// All tenants, newest first
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_page(
        &self,
        tenant_id: TenantId,
        slug: &str,
        title: &str,
        html: &str,
    ) -> StoreResult<Page>;
}

//! In-memory implementation of the tenant and content stores.
//!
//! State lives in `HashMap`s guarded by `tokio::sync::RwLock` and is lost on
//! restart. Used for local development (no `DATABASE_URL`) and tests.
//!
//! Subdomain uniqueness is enforced by checking and inserting under the same
//! write lock, which gives the same guarantee as the Postgres `UNIQUE`
//! constraint for concurrent creation requests within one process.

use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use subsite_shared::{Page, PageId, StoreError, StoreResult, Tenant, TenantId, TenantStatus};

use super::{ContentStore, TenantStore};

#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tenant as-is, bypassing the pending-only insert path.
    ///
    /// Used to seed fixtures in any status.
    pub async fn seed(&self, tenant: Tenant) -> StoreResult<Tenant> {
        let mut tenants = self.tenants.write().await;
        if tenants
            .values()
            .any(|existing| existing.subdomain == tenant.subdomain && existing.id != tenant.id)
        {
            return Err(StoreError::Conflict(format!(
                "subdomain {} already exists",
                tenant.subdomain
            )));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    pub async fn len(&self) -> usize {
        self.tenants.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tenants.read().await.is_empty()
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn find_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<Tenant>> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|tenant| tenant.subdomain == subdomain)
            .cloned())
    }

    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn insert_pending(&self, mut tenant: Tenant) -> StoreResult<Tenant> {
        tenant.status = TenantStatus::Pending;
        self.seed(tenant).await
    }

    async fn update_status(&self, id: TenantId, status: TenantStatus) -> StoreResult<Tenant> {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("tenant {}", id)))?;
        tenant.status = status;
        tenant.updated_at = OffsetDateTime::now_utc();
        Ok(tenant.clone())
    }

    async fn list_active_subdomains(&self) -> StoreResult<Vec<String>> {
        let tenants = self.tenants.read().await;
        let mut subdomains: Vec<String> = tenants
            .values()
            .filter(|tenant| tenant.is_active())
            .map(|tenant| tenant.subdomain.clone())
            .collect();
        subdomains.sort();
        Ok(subdomains)
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let tenants = self.tenants.read().await;
        let mut all: Vec<Tenant> = tenants.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    pages: RwLock<Vec<Page>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pages_for(&self, tenant_id: TenantId) -> Vec<Page> {
        self.pages
            .read()
            .await
            .iter()
            .filter(|page| page.tenant_id == tenant_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create_page(
        &self,
        tenant_id: TenantId,
        slug: &str,
        title: &str,
        html: &str,
    ) -> StoreResult<Page> {
        let mut pages = self.pages.write().await;
        if pages
            .iter()
            .any(|page| page.tenant_id == tenant_id && page.slug == slug)
        {
            return Err(StoreError::Conflict(format!("page {} already exists", slug)));
        }
        let page = Page {
            id: PageId::new(),
            tenant_id,
            slug: slug.to_string(),
            title: title.to_string(),
            html: html.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        pages.push(page.clone());
        Ok(page)
    }
}

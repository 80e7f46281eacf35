//! Fakes shared by unit tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use subsite_shared::{NewTenant, StoreError, StoreResult, Tenant, TenantId, TenantStatus};

use crate::hosting::{tenant_domain, DomainBinding, DomainHosting, DomainStatus, HostingError};
use crate::store::TenantStore;

pub const ROOT: &str = "example.com";

/// Tenant fixture in the given status
pub fn tenant(subdomain: &str, status: TenantStatus) -> Tenant {
    let mut tenant = NewTenant {
        subdomain: subdomain.to_string(),
        name: format!("{} Inc", subdomain),
        email: format!("owner@{}.test", subdomain),
        phone: None,
        primary_color: Some("#336699".to_string()),
    }
    .into_pending();
    tenant.status = status;
    tenant
}

/// Tenant store whose every call fails
pub struct BrokenStore;

fn refused<T>() -> StoreResult<T> {
    Err(StoreError::Database("connection refused".to_string()))
}

#[async_trait]
impl TenantStore for BrokenStore {
    async fn find_by_subdomain(&self, _subdomain: &str) -> StoreResult<Option<Tenant>> {
        refused()
    }
    async fn find_by_id(&self, _id: TenantId) -> StoreResult<Option<Tenant>> {
        refused()
    }
    async fn insert_pending(&self, _tenant: Tenant) -> StoreResult<Tenant> {
        refused()
    }
    async fn update_status(&self, _id: TenantId, _status: TenantStatus) -> StoreResult<Tenant> {
        refused()
    }
    async fn list_active_subdomains(&self) -> StoreResult<Vec<String>> {
        refused()
    }
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        refused()
    }
    async fn health_check(&self) -> StoreResult<()> {
        refused()
    }
    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

/// How the fake provider answers `add_domain`
#[derive(Debug, Clone)]
pub enum HostingMode {
    Succeed,
    Fail(String),
    /// Never answers within any sane timeout
    Hang,
}

/// In-memory hosting provider that records bindings
pub struct FakeHosting {
    mode: Mutex<HostingMode>,
    bound: Mutex<HashSet<String>>,
    add_calls: AtomicUsize,
}

impl FakeHosting {
    pub fn new(mode: HostingMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            bound: Mutex::new(HashSet::new()),
            add_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: HostingMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn bindings(&self) -> usize {
        self.bound.lock().unwrap().len()
    }

    pub fn is_bound(&self, subdomain: &str) -> bool {
        self.bound
            .lock()
            .unwrap()
            .contains(&tenant_domain(subdomain, ROOT))
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainHosting for FakeHosting {
    async fn add_domain(&self, subdomain: &str) -> Result<DomainBinding, HostingError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            HostingMode::Succeed => {
                let domain = tenant_domain(subdomain, ROOT);
                let inserted = self.bound.lock().unwrap().insert(domain.clone());
                Ok(DomainBinding {
                    domain,
                    verified: true,
                    already_existed: !inserted,
                })
            }
            HostingMode::Fail(message) => Err(HostingError::Api {
                status: 500,
                code: None,
                message,
            }),
            HostingMode::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(HostingError::Timeout)
            }
        }
    }

    async fn verify_domain(&self, subdomain: &str) -> bool {
        self.is_bound(subdomain)
    }

    async fn domain_status(&self, subdomain: &str) -> Option<DomainStatus> {
        self.is_bound(subdomain).then(|| DomainStatus {
            domain: tenant_domain(subdomain, ROOT),
            verified: true,
            verification: Vec::new(),
        })
    }

    async fn remove_domain(&self, subdomain: &str) -> bool {
        self.bound
            .lock()
            .unwrap()
            .remove(&tenant_domain(subdomain, ROOT));
        true
    }
}

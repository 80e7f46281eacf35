//! Label-to-tenant resolution
//!
//! Looks a routing label up in the tenant store. No caching is applied: a
//! TTL cache keyed by label (invalidated on status change) would sit here if
//! store latency ever dominates request time.

use std::sync::Arc;

use subsite_shared::Tenant;
use tracing::warn;

use crate::store::TenantStore;

/// Longest label DNS allows
pub const MAX_LABEL_LEN: usize = 63;

/// Result of resolving a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantLookup {
    Found(Tenant),
    NotFound,
}

#[derive(Clone)]
pub struct TenantResolver {
    store: Arc<dyn TenantStore>,
}

impl TenantResolver {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    /// Resolve a label to a tenant record (of any status).
    ///
    /// Store faults are logged and reported as `NotFound` so the request path
    /// never sees them.
    pub async fn resolve(&self, label: &str) -> TenantLookup {
        // Nothing outside [a-z0-9-]{1,63} was ever provisioned
        if !is_subdomain_shaped(label) {
            return TenantLookup::NotFound;
        }

        match self.store.find_by_subdomain(label).await {
            Ok(Some(tenant)) => TenantLookup::Found(tenant),
            Ok(None) => TenantLookup::NotFound,
            Err(e) => {
                warn!(label = %label, error = %e, "Tenant resolution fault, treating as not found");
                TenantLookup::NotFound
            }
        }
    }
}

/// Check a label against the stored subdomain format `[a-z0-9-]{1,63}`
pub fn is_subdomain_shaped(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsite_shared::TenantStatus;

    use crate::store::MemoryTenantStore;
    use crate::test_support::{tenant, BrokenStore};

    #[test]
    fn test_is_subdomain_shaped() {
        assert!(is_subdomain_shaped("acme"));
        assert!(is_subdomain_shaped("swift-cloud-742"));
        assert!(!is_subdomain_shaped(""));
        assert!(!is_subdomain_shaped("Acme"));
        assert!(!is_subdomain_shaped("a.b"));
        assert!(!is_subdomain_shaped("acme_shop"));
        assert!(!is_subdomain_shaped(&"a".repeat(64)));
    }

    #[tokio::test]
    async fn test_resolve_found_and_missing() {
        let store = Arc::new(MemoryTenantStore::new());
        let acme = store
            .insert_pending(tenant("acme", TenantStatus::Pending))
            .await
            .unwrap();

        let resolver = TenantResolver::new(store);
        assert_eq!(resolver.resolve("acme").await, TenantLookup::Found(acme));
        assert_eq!(resolver.resolve("nobody").await, TenantLookup::NotFound);
        assert_eq!(resolver.resolve("a.b").await, TenantLookup::NotFound);
    }

    #[tokio::test]
    async fn test_store_fault_is_not_found() {
        let resolver = TenantResolver::new(Arc::new(BrokenStore));
        assert_eq!(resolver.resolve("acme").await, TenantLookup::NotFound);
    }
}

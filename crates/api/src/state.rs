//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::hosting::DomainHosting;
use crate::provisioning::ProvisioningWorkflow;
use crate::routing::{ReservedNames, TenantRouter};
use crate::store::{ContentStore, TenantStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tenants: Arc<dyn TenantStore>,
    pub hosting: Arc<dyn DomainHosting>,
    pub provisioning: Arc<ProvisioningWorkflow>,
    pub router: Arc<TenantRouter>,
}

impl AppState {
    /// Wire the router and provisioning workflow over the given backends
    pub fn new(
        config: Config,
        tenants: Arc<dyn TenantStore>,
        content: Arc<dyn ContentStore>,
        hosting: Arc<dyn DomainHosting>,
    ) -> Self {
        let provisioning = ProvisioningWorkflow::new(
            tenants.clone(),
            content,
            hosting.clone(),
            ReservedNames::new(&config.reserved_subdomains),
            config.root_domain.clone(),
            config.hosting.timeout,
        );
        let router = TenantRouter::from_config(&config, tenants.clone());

        Self {
            config: Arc::new(config),
            tenants,
            hosting,
            provisioning: Arc::new(provisioning),
            router: Arc::new(router),
        }
    }
}

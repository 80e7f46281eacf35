//! Tenant provisioning workflow
//!
//! validate -> uniqueness -> persist PENDING -> default home page (best
//! effort) -> bind domain (bounded) -> ACTIVE.
//!
//! A failed bind leaves the tenant `PENDING` and is reported with the tenant
//! attached so the caller knows the record exists; [`ProvisioningWorkflow::resume_binding`]
//! re-runs only the bind step.

use std::sync::Arc;
use std::time::Duration;

use subsite_shared::{StoreError, Tenant, TenantId, TenantStatus};
use tracing::{error, info, warn};

use crate::hosting::{tenant_domain, DomainBinding, DomainHosting, HostingError};
use crate::routing::ReservedNames;
use crate::store::{ContentStore, TenantStore};

mod validation;

pub use validation::{
    check_subdomain, normalize_subdomain, validate, CreateTenantRequest, FieldError,
    ValidationErrors,
};

/// Slug of the page created for every new tenant
pub const HOME_PAGE_SLUG: &str = "home";

/// A tenant whose domain is bound and status is `ACTIVE`
#[derive(Debug, Clone)]
pub struct ProvisioningResult {
    pub tenant: Tenant,
    pub url: String,
    /// `None` when the tenant was already active and nothing was called
    pub binding: Option<DomainBinding>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("Tenant not found")]
    NotFound(TenantId),

    /// Tenant persisted as `PENDING`, domain not bound
    #[error("Domain binding failed: {message}")]
    Binding { tenant: Box<Tenant>, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ProvisionError {
    /// Whether a tenant record exists despite the failure
    pub fn tenant_created(&self) -> bool {
        matches!(self, ProvisionError::Binding { .. })
    }

    fn binding(tenant: Tenant, message: impl Into<String>) -> Self {
        ProvisionError::Binding {
            tenant: Box::new(tenant),
            message: message.into(),
        }
    }
}

pub struct ProvisioningWorkflow {
    tenants: Arc<dyn TenantStore>,
    content: Arc<dyn ContentStore>,
    hosting: Arc<dyn DomainHosting>,
    reserved: ReservedNames,
    root_domain: String,
    bind_timeout: Duration,
}

impl ProvisioningWorkflow {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        content: Arc<dyn ContentStore>,
        hosting: Arc<dyn DomainHosting>,
        reserved: ReservedNames,
        root_domain: impl Into<String>,
        bind_timeout: Duration,
    ) -> Self {
        Self {
            tenants,
            content,
            hosting,
            reserved,
            root_domain: root_domain.into(),
            bind_timeout,
        }
    }

    /// Public URL of a tenant site
    pub fn site_url(&self, subdomain: &str) -> String {
        format!("https://{}", tenant_domain(subdomain, &self.root_domain))
    }

    /// Create a tenant and bind its subdomain
    pub async fn provision(
        &self,
        request: CreateTenantRequest,
    ) -> Result<ProvisioningResult, ProvisionError> {
        let new_tenant = validate(&request, &self.reserved).map_err(ProvisionError::Validation)?;

        if self
            .tenants
            .find_by_subdomain(&new_tenant.subdomain)
            .await?
            .is_some()
        {
            return Err(subdomain_taken());
        }

        let tenant = match self.tenants.insert_pending(new_tenant.into_pending()).await {
            Ok(tenant) => tenant,
            // Lost a race with a concurrent signup for the same subdomain
            Err(StoreError::Conflict(_)) => return Err(subdomain_taken()),
            Err(e) => return Err(e.into()),
        };
        info!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, "Tenant persisted as pending");

        self.create_home_page(&tenant).await;
        self.bind(tenant).await
    }

    /// Re-run the domain bind for an existing tenant
    pub async fn resume_binding(&self, id: TenantId) -> Result<ProvisioningResult, ProvisionError> {
        let tenant = self
            .tenants
            .find_by_id(id)
            .await?
            .ok_or(ProvisionError::NotFound(id))?;

        match tenant.status {
            TenantStatus::Active => Ok(ProvisioningResult {
                url: self.site_url(&tenant.subdomain),
                tenant,
                binding: None,
            }),
            TenantStatus::Suspended => Err(ProvisionError::Conflict(
                "Tenant is suspended".to_string(),
            )),
            TenantStatus::Pending => self.bind(tenant).await,
        }
    }

    async fn create_home_page(&self, tenant: &Tenant) {
        let html = default_home_page(tenant);
        if let Err(e) = self
            .content
            .create_page(tenant.id, HOME_PAGE_SLUG, &tenant.name, &html)
            .await
        {
            warn!(tenant_id = %tenant.id, error = %e, "Failed to create default home page");
        }
    }

    async fn bind(&self, tenant: Tenant) -> Result<ProvisioningResult, ProvisionError> {
        let binding = match tokio::time::timeout(
            self.bind_timeout,
            self.hosting.add_domain(&tenant.subdomain),
        )
        .await
        {
            Ok(Ok(binding)) => binding,
            Ok(Err(e)) => {
                warn!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, error = %e, "Domain binding failed, tenant left pending");
                return Err(ProvisionError::binding(tenant, e.to_string()));
            }
            Err(_) => {
                warn!(
                    tenant_id = %tenant.id,
                    subdomain = %tenant.subdomain,
                    timeout_ms = self.bind_timeout.as_millis() as u64,
                    "Domain binding timed out, tenant left pending"
                );
                return Err(ProvisionError::binding(
                    tenant,
                    HostingError::Timeout.to_string(),
                ));
            }
        };

        let tenant = match self
            .tenants
            .update_status(tenant.id, TenantStatus::Active)
            .await
        {
            Ok(activated) => activated,
            Err(e) => {
                error!(tenant_id = %tenant.id, error = %e, "Domain bound but tenant could not be activated");
                return Err(ProvisionError::binding(
                    tenant,
                    format!("Domain bound but activation failed: {}", e),
                ));
            }
        };

        info!(
            tenant_id = %tenant.id,
            domain = %binding.domain,
            already_existed = binding.already_existed,
            "Tenant active"
        );

        Ok(ProvisioningResult {
            url: self.site_url(&tenant.subdomain),
            tenant,
            binding: Some(binding),
        })
    }
}

fn subdomain_taken() -> ProvisionError {
    ProvisionError::Conflict("Subdomain already taken".to_string())
}

/// Minimal landing page shown until the tenant publishes real content
pub fn default_home_page(tenant: &Tenant) -> String {
    let name = escape_html(&tenant.name);
    let color = tenant.primary_color.as_deref().unwrap_or("#111827");
    format!(
        "<main style=\"font-family:sans-serif;padding:4rem 1rem;text-align:center\">\n\
         <h1 style=\"color:{color}\">Welcome to {name}</h1>\n\
         <p>This site is being set up. Check back soon.</p>\n\
         </main>"
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

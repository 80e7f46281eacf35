//! Hosting provider integration
//!
//! Tenants become reachable once their `{subdomain}.{root}` domain is bound
//! to the hosting project. The provisioning workflow only talks to the
//! [`DomainHosting`] capability so it can run against a fake in tests.

use async_trait::async_trait;
use serde::Serialize;

mod vercel;

pub use vercel::VercelClient;

/// Domain binding capability (bind / verify / status / remove)
#[async_trait]
pub trait DomainHosting: Send + Sync {
    /// Bind `{subdomain}.{root}` to the project.
    ///
    /// A domain that is already bound to the project is reported as success
    /// with `already_existed = true`.
    async fn add_domain(&self, subdomain: &str) -> Result<DomainBinding, HostingError>;

    /// Ask the provider to (re)check the domain. Advisory: `false` on any failure.
    async fn verify_domain(&self, subdomain: &str) -> bool;

    /// Current binding, or `None` when absent or the provider can't be reached
    async fn domain_status(&self, subdomain: &str) -> Option<DomainStatus>;

    /// Best-effort unbind; `true` when the domain is no longer bound
    async fn remove_domain(&self, subdomain: &str) -> bool;
}

/// Result of a successful `add_domain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainBinding {
    pub domain: String,
    pub verified: bool,
    pub already_existed: bool,
}

/// Domain state as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainStatus {
    pub domain: String,
    pub verified: bool,
    pub verification: Vec<VerificationRecord>,
}

/// DNS record the provider still expects before it considers the domain verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRecord {
    pub record_type: String,
    pub domain: String,
    pub value: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostingError {
    #[error("Hosting provider not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Hosting provider did not respond in time")]
    Timeout,

    #[error("Hosting provider error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to reach hosting provider: {0}")]
    Transport(String),

    #[error("Unexpected hosting provider response: {0}")]
    InvalidResponse(String),
}

/// Fully-qualified tenant domain
pub fn tenant_domain(subdomain: &str, root_domain: &str) -> String {
    format!("{}.{}", subdomain, root_domain)
}

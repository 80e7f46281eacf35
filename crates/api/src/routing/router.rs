//! Per-request routing decision
//!
//! Precedence, first match wins:
//! 1. explicit override query parameter (environments without wildcard DNS)
//! 2. hostname label under the root domain
//! 3. reserved / empty label -> main site
//! 4. tenant lookup; only `ACTIVE` tenants are served

use std::sync::Arc;

use subsite_shared::Tenant;
use tracing::debug;
use url::form_urlencoded;

use super::hostname::{parse_hostname, HostLabel};
use super::reserved::ReservedNames;
use super::resolver::{TenantLookup, TenantResolver};
use crate::config::Config;
use crate::store::TenantStore;

/// The parts of an inbound request the router looks at
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    pub host: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Main site / dashboard, serve unchanged
    PassThrough,
    /// Serve from the tenant-scoped handlers
    Rewrite(TenantRoute),
    /// A tenant label was given but no active tenant owns it
    NotFound { label: String },
}

/// Rewrite target handed to the tenant-scoped handlers as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRoute {
    pub label: String,
    pub tenant: Tenant,
    /// Original request path
    pub path: String,
    /// Original query string minus the override parameter
    pub query: Option<String>,
}

impl TenantRoute {
    /// Logical path on the tenant-scoped router: `/{label}{path}?{query}`
    pub fn rewritten_path_and_query(&self) -> String {
        let mut target = format!("/{}", self.label);
        if !self.path.is_empty() && self.path != "/" {
            if !self.path.starts_with('/') {
                target.push('/');
            }
            target.push_str(&self.path);
        }
        if let Some(query) = &self.query {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

/// Hostname -> tenant router
#[derive(Clone)]
pub struct TenantRouter {
    root_domain: String,
    reserved: ReservedNames,
    override_param: Option<String>,
    resolver: TenantResolver,
}

impl TenantRouter {
    pub fn new(
        root_domain: impl Into<String>,
        reserved: ReservedNames,
        override_param: Option<String>,
        resolver: TenantResolver,
    ) -> Self {
        Self {
            root_domain: root_domain.into(),
            reserved,
            override_param,
            resolver,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn TenantStore>) -> Self {
        Self::new(
            config.root_domain.clone(),
            ReservedNames::new(&config.reserved_subdomains),
            config.routing_override_param.clone(),
            TenantResolver::new(store),
        )
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    pub fn reserved(&self) -> &ReservedNames {
        &self.reserved
    }

    /// Decide how to route one request. Never fails: faults degrade to
    /// `PassThrough` before a label exists and to `NotFound` after.
    pub async fn decide(&self, target: &RequestTarget<'_>) -> RoutingDecision {
        // PARSED
        let label = match self.override_label(target.query) {
            Some(label) => label,
            None => match parse_hostname(target.host.unwrap_or_default(), &self.root_domain) {
                HostLabel::Label(label) => label,
                HostLabel::NotASubdomain => return RoutingDecision::PassThrough,
            },
        };
        let label = label.to_ascii_lowercase();

        // FILTERED
        if self.reserved.is_reserved(&label) {
            debug!(label = %label, "Reserved subdomain, passing through");
            return RoutingDecision::PassThrough;
        }

        // RESOLVED
        let tenant = match self.resolver.resolve(&label).await {
            TenantLookup::Found(tenant) if tenant.is_active() => tenant,
            TenantLookup::Found(tenant) => {
                debug!(label = %label, status = %tenant.status, "Tenant not active");
                return RoutingDecision::NotFound { label };
            }
            TenantLookup::NotFound => {
                debug!(label = %label, "No tenant for label");
                return RoutingDecision::NotFound { label };
            }
        };

        // DECIDED
        RoutingDecision::Rewrite(TenantRoute {
            label,
            tenant,
            path: target.path.to_string(),
            query: target
                .query
                .and_then(|query| self.forwarded_query(query)),
        })
    }

    /// Non-empty value of the override parameter, if the override is enabled
    fn override_label(&self, query: Option<&str>) -> Option<String> {
        let param = self.override_param.as_deref()?;
        form_urlencoded::parse(query?.as_bytes())
            .find(|(key, _)| key == param)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn forwarded_query(&self, query: &str) -> Option<String> {
        let stripped = match self.override_param.as_deref() {
            Some(param) => strip_query_param(query, param),
            None => query.to_string(),
        };
        (!stripped.is_empty()).then_some(stripped)
    }
}

/// Drop every `param=...` pair from a raw query string, leaving the other
/// pairs byte-for-byte as they were.
pub fn strip_query_param(query: &str, param: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            form_urlencoded::parse(pair.as_bytes())
                .next()
                .map_or(true, |(key, _)| key != param)
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsite_shared::TenantStatus;

    use crate::store::MemoryTenantStore;
    use crate::test_support::{tenant, BrokenStore, ROOT};

    async fn router_with(tenants: &[(&str, TenantStatus)]) -> TenantRouter {
        let store = Arc::new(MemoryTenantStore::new());
        for (subdomain, status) in tenants {
            store.seed(tenant(subdomain, *status)).await.unwrap();
        }
        TenantRouter::new(
            ROOT,
            ReservedNames::default(),
            Some("subdomain".to_string()),
            TenantResolver::new(store),
        )
    }

    fn target<'a>(host: &'a str, path: &'a str, query: Option<&'a str>) -> RequestTarget<'a> {
        RequestTarget {
            host: Some(host),
            path,
            query,
        }
    }

    fn expect_rewrite(decision: RoutingDecision) -> TenantRoute {
        match decision {
            RoutingDecision::Rewrite(route) => route,
            other => panic!("expected rewrite, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_root_domain_passes_through() {
        let router = router_with(&[]).await;
        assert_eq!(
            router.decide(&target("example.com", "/", None)).await,
            RoutingDecision::PassThrough
        );
        assert_eq!(
            router.decide(&target("other.org", "/", None)).await,
            RoutingDecision::PassThrough
        );
        let no_host = RequestTarget {
            host: None,
            path: "/",
            query: None,
        };
        assert_eq!(router.decide(&no_host).await, RoutingDecision::PassThrough);
    }

    #[tokio::test]
    async fn test_reserved_passes_through_even_with_tenant_record() {
        let router = router_with(&[
            ("www", TenantStatus::Active),
            ("api", TenantStatus::Active),
            ("dashboard", TenantStatus::Active),
        ])
        .await;

        for host in [
            "www.example.com",
            "API.example.com",
            "dashboard.example.com:443",
            "app.example.com",
            "admin.example.com",
        ] {
            assert_eq!(
                router.decide(&target(host, "/dashboard", None)).await,
                RoutingDecision::PassThrough,
                "{}",
                host
            );
        }
    }

    #[tokio::test]
    async fn test_active_tenant_rewrites_preserving_path_and_query() {
        let router = router_with(&[("acme", TenantStatus::Active)]).await;

        let route = expect_rewrite(
            router
                .decide(&target("acme.example.com", "/about/team", Some("lang=pl&page=2")))
                .await,
        );
        assert_eq!(route.label, "acme");
        assert_eq!(route.tenant.subdomain, "acme");
        assert_eq!(route.path, "/about/team");
        assert_eq!(route.query.as_deref(), Some("lang=pl&page=2"));
        assert_eq!(
            route.rewritten_path_and_query(),
            "/acme/about/team?lang=pl&page=2"
        );
    }

    #[tokio::test]
    async fn test_uppercase_host_label_resolves() {
        let router = router_with(&[("acme", TenantStatus::Active)]).await;
        let route = expect_rewrite(router.decide(&target("ACME.Example.com", "/", None)).await);
        assert_eq!(route.label, "acme");
        assert_eq!(route.rewritten_path_and_query(), "/acme");
    }

    #[tokio::test]
    async fn test_inactive_tenants_are_not_found() {
        let router = router_with(&[
            ("pending-co", TenantStatus::Pending),
            ("paused-co", TenantStatus::Suspended),
        ])
        .await;

        for label in ["pending-co", "paused-co"] {
            let host = format!("{}.example.com", label);
            assert_eq!(
                router.decide(&target(&host, "/", None)).await,
                RoutingDecision::NotFound {
                    label: label.to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_label_is_not_found() {
        let router = router_with(&[]).await;
        assert_eq!(
            router.decide(&target("unknown-label.example.com", "/", None)).await,
            RoutingDecision::NotFound {
                label: "unknown-label".to_string()
            }
        );
        assert_eq!(
            router.decide(&target("a.b.example.com", "/", None)).await,
            RoutingDecision::NotFound {
                label: "a.b".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_store_fault_degrades_to_not_found() {
        let router = TenantRouter::new(
            ROOT,
            ReservedNames::default(),
            None,
            TenantResolver::new(Arc::new(BrokenStore)),
        );
        assert_eq!(
            router.decide(&target("acme.example.com", "/", None)).await,
            RoutingDecision::NotFound {
                label: "acme".to_string()
            }
        );
        // No label extracted: the store is never consulted
        assert_eq!(
            router.decide(&target("example.com", "/", None)).await,
            RoutingDecision::PassThrough
        );
    }

    #[tokio::test]
    async fn test_override_param_wins_over_hostname() {
        let router = router_with(&[
            ("acme", TenantStatus::Active),
            ("beta", TenantStatus::Active),
        ])
        .await;

        let route = expect_rewrite(
            router
                .decide(&target(
                    "beta.example.com",
                    "/contact",
                    Some("subdomain=acme&ref=mail"),
                ))
                .await,
        );
        assert_eq!(route.label, "acme");
        assert_eq!(route.query.as_deref(), Some("ref=mail"));
        assert_eq!(route.rewritten_path_and_query(), "/acme/contact?ref=mail");

        // Works from a host with no subdomain at all
        let route = expect_rewrite(
            router
                .decide(&target("platform.vercel.app", "/", Some("subdomain=beta")))
                .await,
        );
        assert_eq!(route.label, "beta");
        assert_eq!(route.query, None);
    }

    #[tokio::test]
    async fn test_override_still_filtered_and_resolved() {
        let router = router_with(&[
            ("www", TenantStatus::Active),
            ("pending-co", TenantStatus::Pending),
        ])
        .await;

        assert_eq!(
            router
                .decide(&target("example.com", "/", Some("subdomain=WWW")))
                .await,
            RoutingDecision::PassThrough
        );
        assert_eq!(
            router
                .decide(&target("example.com", "/", Some("subdomain=pending-co")))
                .await,
            RoutingDecision::NotFound {
                label: "pending-co".to_string()
            }
        );
        // Empty override is ignored, hostname decides
        assert_eq!(
            router
                .decide(&target("example.com", "/", Some("subdomain=")))
                .await,
            RoutingDecision::PassThrough
        );
    }

    #[tokio::test]
    async fn test_override_disabled() {
        let store = Arc::new(MemoryTenantStore::new());
        store
            .seed(tenant("acme", TenantStatus::Active))
            .await
            .unwrap();
        let router = TenantRouter::new(
            ROOT,
            ReservedNames::default(),
            None,
            TenantResolver::new(store),
        );

        assert_eq!(
            router
                .decide(&target("example.com", "/", Some("subdomain=acme")))
                .await,
            RoutingDecision::PassThrough
        );
        let route = expect_rewrite(
            router
                .decide(&target("acme.example.com", "/", Some("subdomain=acme")))
                .await,
        );
        assert_eq!(route.query.as_deref(), Some("subdomain=acme"));
    }

    #[test]
    fn test_strip_query_param() {
        assert_eq!(strip_query_param("subdomain=acme", "subdomain"), "");
        assert_eq!(
            strip_query_param("a=1&subdomain=acme&b=%20x", "subdomain"),
            "a=1&b=%20x"
        );
        assert_eq!(
            strip_query_param("subdomain=a&&subdomain=b&keep", "subdomain"),
            "keep"
        );
        assert_eq!(
            strip_query_param("subdomains=1&x=2", "subdomain"),
            "subdomains=1&x=2"
        );
    }
}

//! Host-based routing for tenant sites
//!
//! Maps an incoming request to one of:
//! - the main site (root domain, reserved subdomains, foreign hosts)
//! - an active tenant's site: acme.example.com -> tenant `acme`
//! - a tenant-not-found page
//!
//! An explicit `?subdomain=acme` override takes priority over the hostname
//! for preview deployments without wildcard DNS.

mod hostname;
mod middleware;
mod reserved;
mod resolver;
mod router;

pub use hostname::{parse_hostname, HostLabel};
pub use middleware::{dispatch_tenant, SiteDispatch};
pub use reserved::ReservedNames;
pub use resolver::{is_subdomain_shaped, TenantLookup, TenantResolver, MAX_LABEL_LEN};
pub use router::{strip_query_param, RequestTarget, RoutingDecision, TenantRoute, TenantRouter};

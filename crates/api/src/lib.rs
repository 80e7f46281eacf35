//! Subsite API Library
//!
//! Multi-tenant site hosting: routes `{tenant}.{root}` requests to the
//! tenant's site and provisions new tenants with their own subdomain.

pub mod config;
pub mod error;
pub mod hosting;
pub mod provisioning;
pub mod routes;
pub mod routing;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routing::{RoutingDecision, TenantRoute, TenantRouter};
pub use state::AppState;

//! Tenant-scoped site routes
//!
//! Only reachable through the subdomain dispatch middleware, which rewrites
//! requests to `/{label}/...` and attaches the resolved [`TenantRoute`].

use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::routing::TenantRoute;

/// Public attributes of the tenant whose site is being rendered
#[derive(Debug, Serialize)]
pub struct SiteTenant {
    pub subdomain: String,
    pub name: String,
    pub primary_color: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SiteDescriptor {
    pub tenant: SiteTenant,
    pub path: String,
    pub query: Option<String>,
}

pub fn tenant_router() -> Router {
    Router::new()
        .route("/:label", get(site_page))
        .route("/:label/*path", get(site_page))
}

/// Describe what the renderer should draw for this tenant request
pub async fn site_page(Extension(route): Extension<TenantRoute>) -> Json<SiteDescriptor> {
    let tenant = route.tenant;
    Json(SiteDescriptor {
        tenant: SiteTenant {
            subdomain: tenant.subdomain,
            name: tenant.name,
            primary_color: tenant.primary_color,
            phone: tenant.phone,
        },
        path: route.path,
        query: route.query,
    })
}

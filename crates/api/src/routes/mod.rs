//! API routes

pub mod domains;
pub mod health;
pub mod site;
pub mod tenants;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    error::ApiError,
    routing::{dispatch_tenant, SiteDispatch},
    state::AppState,
};

/// Create the full application router
///
/// Every request first goes through the subdomain dispatcher; only requests
/// for the main site reach the routes below.
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Main-site API under /api/v1
    let api_v1_routes = Router::new()
        .route(
            "/tenants",
            get(tenants::list_tenants).post(tenants::create_tenant),
        )
        .route("/tenants/:tenant_id/bind", post(tenants::bind_tenant))
        .route("/sites", get(tenants::list_sites))
        .route(
            "/domains/:subdomain",
            get(domains::get_domain).delete(domains::remove_domain),
        )
        .route("/domains/:subdomain/verify", post(domains::verify_domain));

    let dispatch = SiteDispatch::new(state.router.clone(), site::tenant_router());

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_v1_routes)
        .fallback(|| async { ApiError::NotFound })
        // Fallback must exist before this layer so unmatched paths are dispatched too
        .layer(middleware::from_fn_with_state(dispatch, dispatch_tenant))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

//! Subdomain dispatch middleware
//!
//! Sits in front of the main router. Requests for an active tenant are
//! rewritten to `/{label}{path}` and handed to the tenant-scoped router with
//! the resolved [`TenantRoute`] attached as an extension; everything else
//! continues down the main stack.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceExt;
use tracing::{debug, warn};

use super::router::{RequestTarget, RoutingDecision, TenantRouter};
use crate::error::ApiError;

/// Dispatch table: decision maker plus the tenant-scoped handlers
#[derive(Clone)]
pub struct SiteDispatch {
    router: Arc<TenantRouter>,
    tenant_routes: Router,
}

impl SiteDispatch {
    /// `tenant_routes` must be fully built (state applied) and route on `/:label`
    pub fn new(router: Arc<TenantRouter>, tenant_routes: Router) -> Self {
        Self {
            router,
            tenant_routes,
        }
    }
}

/// Host as the client sent it: `Host` header, else the request-target authority
fn request_host(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().host().map(str::to_string))
}

pub async fn dispatch_tenant(
    State(dispatch): State<SiteDispatch>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let host = request_host(&request);
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let decision = dispatch
        .router
        .decide(&RequestTarget {
            host: host.as_deref(),
            path: &path,
            query: query.as_deref(),
        })
        .await;

    match decision {
        RoutingDecision::PassThrough => next.run(request).await,
        RoutingDecision::NotFound { label } => {
            debug!(label = %label, path = %path, "No active tenant for request");
            ApiError::TenantNotFound(label).into_response()
        }
        RoutingDecision::Rewrite(route) => {
            let target = route.rewritten_path_and_query();
            let uri = match target.parse::<Uri>() {
                Ok(uri) => uri,
                Err(e) => {
                    warn!(target = %target, error = %e, "Rewritten tenant URI is invalid");
                    return ApiError::BadRequest("Invalid request path".to_string())
                        .into_response();
                }
            };

            debug!(label = %route.label, from = %path, to = %target, "Rewriting to tenant site");
            *request.uri_mut() = uri;
            request.extensions_mut().insert(route);

            match dispatch.tenant_routes.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        }
    }
}

//! Tenant domain routes
//!
//! Thin wrappers over the hosting provider for operators: inspect, re-verify
//! or unbind `{subdomain}.{root}`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    hosting::DomainStatus,
    provisioning::normalize_subdomain,
    routing::is_subdomain_shaped,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct VerifyDomainResponse {
    pub subdomain: String,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveDomainResponse {
    pub subdomain: String,
    pub removed: bool,
}

fn subdomain_param(raw: &str) -> ApiResult<String> {
    let subdomain = normalize_subdomain(raw);
    if !is_subdomain_shaped(&subdomain) {
        return Err(ApiError::BadRequest(format!("Invalid subdomain '{}'", raw)));
    }
    Ok(subdomain)
}

/// Current binding as reported by the provider
pub async fn get_domain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> ApiResult<Json<DomainStatus>> {
    let subdomain = subdomain_param(&subdomain)?;
    state
        .hosting
        .domain_status(&subdomain)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Ask the provider to re-check DNS for the domain
pub async fn verify_domain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> ApiResult<Json<VerifyDomainResponse>> {
    let subdomain = subdomain_param(&subdomain)?;
    let verified = state.hosting.verify_domain(&subdomain).await;
    tracing::info!(subdomain = %subdomain, verified, "Domain verification requested");
    Ok(Json(VerifyDomainResponse {
        subdomain,
        verified,
    }))
}

/// Best-effort unbind; the tenant record is left untouched
pub async fn remove_domain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> ApiResult<Json<RemoveDomainResponse>> {
    let subdomain = subdomain_param(&subdomain)?;
    let removed = state.hosting.remove_domain(&subdomain).await;
    if !removed {
        tracing::warn!(subdomain = %subdomain, "Domain removal did not complete");
    }
    Ok(Json(RemoveDomainResponse { subdomain, removed }))
}

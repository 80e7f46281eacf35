//! Tenant signup and management routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use subsite_shared::{Tenant, TenantId};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    provisioning::CreateTenantRequest,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct TenantListResponse {
    pub tenants: Vec<Tenant>,
}

#[derive(Debug, Serialize)]
pub struct CreateTenantResponse {
    pub success: bool,
    pub tenant: Tenant,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct BindTenantResponse {
    pub success: bool,
    pub tenant: Tenant,
    pub url: String,
    /// False when the tenant was already active and no provider call was made
    pub bound_now: bool,
}

#[derive(Debug, Serialize)]
pub struct SitesResponse {
    pub subdomains: Vec<String>,
}

/// List all tenants, newest first
pub async fn list_tenants(State(state): State<AppState>) -> ApiResult<Json<TenantListResponse>> {
    let tenants = state.tenants.list_tenants().await?;
    Ok(Json(TenantListResponse { tenants }))
}

/// Create a tenant and bind its subdomain
///
/// Every failure body carries `tenant_created` so the signup form can tell
/// "try again" apart from "your site exists but isn't live yet". That
/// includes bodies the JSON extractor rejects.
pub async fn create_tenant(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return creation_failure(ApiError::BadRequest(rejection.body_text()), false)
        }
    };

    match state.provisioning.provision(req).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(CreateTenantResponse {
                success: true,
                tenant: result.tenant,
                url: result.url,
            }),
        )
            .into_response(),
        Err(e) => {
            let tenant_created = e.tenant_created();
            creation_failure(ApiError::from(e), tenant_created)
        }
    }
}

fn creation_failure(err: ApiError, tenant_created: bool) -> Response {
    let mut body = err.body();
    body["tenant_created"] = json!(tenant_created);
    (err.status_code(), Json(body)).into_response()
}

/// Retry the domain bind for a tenant left pending
pub async fn bind_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Json<BindTenantResponse>> {
    let result = state
        .provisioning
        .resume_binding(TenantId(tenant_id))
        .await?;

    Ok(Json(BindTenantResponse {
        success: true,
        bound_now: result.binding.is_some(),
        tenant: result.tenant,
        url: result.url,
    }))
}

/// Subdomains currently served, for static route enumeration
pub async fn list_sites(State(state): State<AppState>) -> ApiResult<Json<SitesResponse>> {
    let subdomains = state.tenants.list_active_subdomains().await?;
    Ok(Json(SitesResponse { subdomains }))
}

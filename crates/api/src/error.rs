//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use subsite_shared::{StoreError, Tenant};

use crate::provisioning::{ProvisionError, ValidationErrors};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation errors
    #[error("Validation error: {0}")]
    InvalidFields(ValidationErrors),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,
    #[error("Site not found")]
    TenantNotFound(String),
    #[error("Resource already exists")]
    Conflict(String),

    // Provisioning errors
    #[error("Domain binding failed: {message}")]
    BindingFailed { tenant: Box<Tenant>, message: String },

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidFields(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::TenantNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BindingFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body: `{ "error": { "code", "message" } }` plus variant extras
    pub fn body(&self) -> Value {
        let (code, message) = match self {
            ApiError::InvalidFields(errors) => (
                "VALIDATION_ERROR",
                format!("Invalid fields: {}", errors.field_names().join(", ")),
            ),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            ApiError::NotFound => ("NOT_FOUND", self.to_string()),
            ApiError::TenantNotFound(label) => (
                "TENANT_NOT_FOUND",
                format!("No site is published at '{}'", label),
            ),
            ApiError::Conflict(msg) => ("CONFLICT", msg.clone()),
            ApiError::BindingFailed { message, .. } => ("DOMAIN_BINDING_FAILED", message.clone()),
            ApiError::Database(_) => ("DATABASE_ERROR", "Database error".to_string()),
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        match self {
            ApiError::InvalidFields(errors) => {
                body["fields"] = json!(errors);
            }
            // The tenant exists (PENDING); the caller must know that
            ApiError::BindingFailed { tenant, .. } => {
                body["success"] = json!(false);
                body["tenant"] = json!(tenant);
                body["tenant_created"] = json!(true);
            }
            _ => {}
        }

        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(msg) | StoreError::Corrupt(msg) => {
                tracing::error!("Store error: {}", msg);
                ApiError::Database(msg)
            }
        }
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Validation(errors) => ApiError::InvalidFields(errors),
            ProvisionError::Conflict(msg) => ApiError::Conflict(msg),
            ProvisionError::NotFound(_) => ApiError::NotFound,
            ProvisionError::Binding { tenant, message } => {
                ApiError::BindingFailed { tenant, message }
            }
            ProvisionError::Store(e) => e.into(),
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

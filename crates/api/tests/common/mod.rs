//! Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use subsite_api::{
    config::{Config, HostingConfig, LogFormat, DEFAULT_RESERVED_SUBDOMAINS},
    hosting::{tenant_domain, DomainBinding, DomainHosting, DomainStatus, HostingError},
    routes::create_router,
    store::{MemoryContentStore, MemoryTenantStore},
    AppState,
};
use tower::ServiceExt;

pub const ROOT: &str = "example.com";

pub fn test_config(api_url: &str) -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        log_format: LogFormat::Pretty,
        root_domain: ROOT.to_string(),
        reserved_subdomains: DEFAULT_RESERVED_SUBDOMAINS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        routing_override_param: Some("subdomain".to_string()),
        database_url: None,
        database_max_connections: 1,
        hosting: HostingConfig {
            api_url: api_url.to_string(),
            api_token: "test-token".to_string(),
            project_id: "prj_test".to_string(),
            team_id: None,
            timeout: Duration::from_millis(500),
        },
    }
}

/// Hosting provider double: binds into a set, or fails with a message
#[derive(Default)]
pub struct StubHosting {
    failure: Mutex<Option<String>>,
    bound: Mutex<HashSet<String>>,
}

impl StubHosting {
    pub fn failing(message: &str) -> Self {
        let stub = Self::default();
        stub.fail_with(Some(message));
        stub
    }

    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    pub fn is_bound(&self, subdomain: &str) -> bool {
        self.bound
            .lock()
            .unwrap()
            .contains(&tenant_domain(subdomain, ROOT))
    }
}

#[async_trait]
impl DomainHosting for StubHosting {
    async fn add_domain(&self, subdomain: &str) -> Result<DomainBinding, HostingError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(HostingError::Api {
                status: 400,
                code: Some("bad_request".to_string()),
                message,
            });
        }
        let domain = tenant_domain(subdomain, ROOT);
        let inserted = self.bound.lock().unwrap().insert(domain.clone());
        Ok(DomainBinding {
            domain,
            verified: true,
            already_existed: !inserted,
        })
    }

    async fn verify_domain(&self, subdomain: &str) -> bool {
        self.is_bound(subdomain)
    }

    async fn domain_status(&self, subdomain: &str) -> Option<DomainStatus> {
        self.is_bound(subdomain).then(|| DomainStatus {
            domain: tenant_domain(subdomain, ROOT),
            verified: true,
            verification: Vec::new(),
        })
    }

    async fn remove_domain(&self, subdomain: &str) -> bool {
        self.bound
            .lock()
            .unwrap()
            .remove(&tenant_domain(subdomain, ROOT));
        true
    }
}

pub struct TestApp {
    pub router: Router,
    pub tenants: Arc<MemoryTenantStore>,
    pub content: Arc<MemoryContentStore>,
}

pub fn app_with(hosting: Arc<dyn DomainHosting>, config: Config) -> TestApp {
    let tenants = Arc::new(MemoryTenantStore::new());
    let content = Arc::new(MemoryContentStore::new());
    let state = AppState::new(config, tenants.clone(), content.clone(), hosting);
    TestApp {
        router: create_router(state),
        tenants,
        content,
    }
}

pub fn app(hosting: Arc<StubHosting>) -> TestApp {
    app_with(hosting, test_config("http://127.0.0.1:9"))
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        host: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, host);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// POST a body as-is, with an optional content type
    pub async fn post_raw(
        &self,
        host: &str,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::HOST, host);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, host: &str, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, host, uri, None).await
    }

    pub async fn post(&self, host: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, host, uri, Some(body)).await
    }
}

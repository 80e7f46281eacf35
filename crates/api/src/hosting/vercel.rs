//! Vercel project-domains API client
//!
//! Binds tenant subdomains to the Vercel project that serves the shared
//! site. Every call is project-scoped and authenticated with a bearer token;
//! `teamId` is appended when the project lives under a team.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{
    tenant_domain, DomainBinding, DomainHosting, DomainStatus, HostingError, VerificationRecord,
};
use crate::config::HostingConfig;

/// Client for the hosting provider's domain API
#[derive(Clone)]
pub struct VercelClient {
    client: Client,
    api_url: String,
    api_token: String,
    project_id: String,
    team_id: Option<String>,
    root_domain: String,
}

#[derive(Debug, Serialize)]
struct AddDomainRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProjectDomain {
    name: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    verification: Vec<VerificationEntry>,
}

#[derive(Debug, Deserialize)]
struct VerificationEntry {
    #[serde(rename = "type")]
    record_type: String,
    domain: String,
    value: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl From<ProjectDomain> for DomainStatus {
    fn from(domain: ProjectDomain) -> Self {
        Self {
            domain: domain.name,
            verified: domain.verified,
            verification: domain
                .verification
                .into_iter()
                .map(|entry| VerificationRecord {
                    record_type: entry.record_type,
                    domain: entry.domain,
                    value: entry.value,
                    reason: entry.reason,
                })
                .collect(),
        }
    }
}

impl VercelClient {
    /// Create a client; blank credentials are rejected here rather than at call time
    pub fn new(config: &HostingConfig, root_domain: &str) -> Result<Self, HostingError> {
        if config.api_token.trim().is_empty() {
            return Err(HostingError::NotConfigured("API token is missing"));
        }
        if config.project_id.trim().is_empty() {
            return Err(HostingError::NotConfigured("project id is missing"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HostingError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            project_id: config.project_id.clone(),
            team_id: config.team_id.clone(),
            root_domain: root_domain.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.api_token);
        match &self.team_id {
            Some(team_id) => builder.query(&[("teamId", team_id)]),
            None => builder,
        }
    }

    fn domain_path(&self, domain: &str) -> String {
        format!("/v9/projects/{}/domains/{}", self.project_id, domain)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, HostingError> {
        builder.send().await.map_err(transport_error)
    }

    async fn fetch_domain(&self, domain: &str) -> Result<Option<ProjectDomain>, HostingError> {
        let response = self
            .send(self.request(Method::GET, &self.domain_path(domain)))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<ProjectDomain>()
                .await
                .map(Some)
                .map_err(|e| HostingError::InvalidResponse(e.to_string())),
            _ => Err(api_error(response).await),
        }
    }
}

#[async_trait]
impl DomainHosting for VercelClient {
    async fn add_domain(&self, subdomain: &str) -> Result<DomainBinding, HostingError> {
        let domain = tenant_domain(subdomain, &self.root_domain);
        let path = format!("/v10/projects/{}/domains", self.project_id);

        let response = self
            .send(
                self.request(Method::POST, &path)
                    .json(&AddDomainRequest { name: &domain }),
            )
            .await?;

        if response.status().is_success() {
            let bound: ProjectDomain = response
                .json()
                .await
                .map_err(|e| HostingError::InvalidResponse(e.to_string()))?;
            info!(domain = %domain, verified = bound.verified, "Domain added to hosting project");
            return Ok(DomainBinding {
                domain,
                verified: bound.verified,
                already_existed: false,
            });
        }

        let err = api_error(response).await;
        if !is_already_exists(&err) {
            error!(domain = %domain, error = %err, "Hosting provider rejected domain");
            return Err(err);
        }

        // "Already exists" only counts as success when the domain is bound to
        // this project, not when some other project holds it.
        match self.fetch_domain(&domain).await? {
            Some(existing) => {
                info!(domain = %domain, "Domain already bound to hosting project");
                Ok(DomainBinding {
                    domain,
                    verified: existing.verified,
                    already_existed: true,
                })
            }
            None => {
                warn!(domain = %domain, error = %err, "Domain is taken outside this project");
                Err(err)
            }
        }
    }

    async fn verify_domain(&self, subdomain: &str) -> bool {
        let domain = tenant_domain(subdomain, &self.root_domain);
        let path = format!("{}/verify", self.domain_path(&domain));

        let response = match self.send(self.request(Method::POST, &path)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Domain verification call failed");
                return false;
            }
        };

        if !response.status().is_success() {
            let err = api_error(response).await;
            warn!(domain = %domain, error = %err, "Domain not verified");
            return false;
        }

        match response.json::<ProjectDomain>().await {
            Ok(verified) => verified.verified,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Unreadable verification response");
                false
            }
        }
    }

    async fn domain_status(&self, subdomain: &str) -> Option<DomainStatus> {
        let domain = tenant_domain(subdomain, &self.root_domain);
        match self.fetch_domain(&domain).await {
            Ok(found) => found.map(DomainStatus::from),
            Err(e) => {
                warn!(domain = %domain, error = %e, "Failed to fetch domain status");
                None
            }
        }
    }

    async fn remove_domain(&self, subdomain: &str) -> bool {
        let domain = tenant_domain(subdomain, &self.root_domain);

        let response = match self
            .send(self.request(Method::DELETE, &self.domain_path(&domain)))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Domain removal call failed");
                return false;
            }
        };

        match response.status() {
            status if status.is_success() => {
                info!(domain = %domain, "Domain removed from hosting project");
                true
            }
            StatusCode::NOT_FOUND => true,
            _ => {
                let err = api_error(response).await;
                warn!(domain = %domain, error = %err, "Hosting provider refused domain removal");
                false
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> HostingError {
    if err.is_timeout() {
        HostingError::Timeout
    } else {
        HostingError::Transport(err.to_string())
    }
}

/// Turn a non-success response into `HostingError::Api`, keeping the provider's message
async fn api_error(response: Response) -> HostingError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => HostingError::Api {
            status,
            code: envelope.error.code,
            message: envelope
                .error
                .message
                .unwrap_or_else(|| "no message".to_string()),
        },
        Err(_) => HostingError::Api {
            status,
            code: None,
            message: if body.is_empty() {
                "no message".to_string()
            } else {
                body
            },
        },
    }
}

fn is_already_exists(err: &HostingError) -> bool {
    match err {
        HostingError::Api {
            status,
            code,
            message,
        } => {
            *status == StatusCode::CONFLICT.as_u16()
                || code.as_deref().is_some_and(|c| c.starts_with("domain_already"))
                || message.contains("already exists")
        }
        _ => false,
    }
}

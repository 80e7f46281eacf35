//! Application configuration

use std::env;
use std::fmt;
use std::time::Duration;

/// Reserved labels used when `RESERVED_SUBDOMAINS` is not set
pub const DEFAULT_RESERVED_SUBDOMAINS: &[&str] = &["www", "app", "admin", "api", "dashboard"];

/// Query parameter that substitutes for hostname-derived routing
pub const DEFAULT_ROUTING_OVERRIDE_PARAM: &str = "subdomain";

const DEFAULT_VERCEL_API_URL: &str = "https://api.vercel.com";

/// Application configuration loaded from environment variables
///
/// Built once at startup and shared read-only; request handling never reads
/// the environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub log_format: LogFormat,

    // Routing
    pub root_domain: String, // e.g., "example.com" for *.example.com tenants
    pub reserved_subdomains: Vec<String>,
    pub routing_override_param: Option<String>,

    // Database (unset = in-memory stores)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Hosting provider
    pub hosting: HostingConfig,
}

/// Credentials and limits for the hosting provider's domain API
#[derive(Clone)]
pub struct HostingConfig {
    pub api_url: String,
    pub api_token: String,
    pub project_id: String,
    pub team_id: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for HostingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostingConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("team_id", &self.team_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let root_domain = normalize_root_domain(
            &env::var("ROOT_DOMAIN").map_err(|_| ConfigError::Missing("ROOT_DOMAIN"))?,
        );
        if root_domain.is_empty() {
            return Err(ConfigError::Invalid("ROOT_DOMAIN must not be empty"));
        }

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },

            // Routing
            root_domain,
            reserved_subdomains: match env::var("RESERVED_SUBDOMAINS") {
                Ok(list) => parse_list(&list),
                Err(_) => DEFAULT_RESERVED_SUBDOMAINS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            routing_override_param: match env::var("ROUTING_OVERRIDE_PARAM") {
                Ok(param) if param.trim().is_empty() => None,
                Ok(param) => Some(param.trim().to_string()),
                Err(_) => Some(DEFAULT_ROUTING_OVERRIDE_PARAM.to_string()),
            },

            // Database
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            // Hosting provider
            hosting: HostingConfig {
                api_url: env::var("VERCEL_API_URL")
                    .unwrap_or_else(|_| DEFAULT_VERCEL_API_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_token: required("VERCEL_API_TOKEN")?,
                project_id: required("VERCEL_PROJECT_ID")?,
                team_id: env::var("VERCEL_TEAM_ID").ok().filter(|id| !id.is_empty()),
                timeout: hosting_timeout()?,
            },
        })
    }
}

fn hosting_timeout() -> Result<Duration, ConfigError> {
    let millis: u64 = env::var("HOSTING_TIMEOUT_MS")
        .unwrap_or_else(|_| "10000".to_string())
        .parse()
        .unwrap_or(10_000);
    if millis == 0 {
        return Err(ConfigError::Invalid("HOSTING_TIMEOUT_MS must be greater than 0"));
    }
    Ok(Duration::from_millis(millis))
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn normalize_root_domain(raw: &str) -> String {
    raw.trim().trim_matches('.').to_lowercase()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

//! Common types used across Subsite

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Page ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// =============================================================================
// Tenant
// =============================================================================

/// Tenant lifecycle status (stored as TEXT)
///
/// `Pending` until the hosting provider confirms the subdomain binding.
/// Only `Active` tenants are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Pending,
    Active,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Pending => "PENDING",
            TenantStatus::Active => "ACTIVE",
            TenantStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TenantStatus::Pending),
            "ACTIVE" => Ok(TenantStatus::Active),
            "SUSPENDED" => Ok(TenantStatus::Suspended),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tenant status: {0}")]
pub struct UnknownStatus(pub String);

/// One client's site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub subdomain: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub primary_color: Option<String>,
    pub status: TenantStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

/// Validated input for a tenant that is about to be persisted as `Pending`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub subdomain: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub primary_color: Option<String>,
}

impl NewTenant {
    /// Build the pending record the store will persist
    pub fn into_pending(self) -> Tenant {
        let now = OffsetDateTime::now_utc();
        Tenant {
            id: TenantId::new(),
            subdomain: self.subdomain,
            name: self.name,
            email: self.email,
            phone: self.phone,
            primary_color: self.primary_color,
            status: TenantStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Content
// =============================================================================

/// A content page owned by a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub tenant_id: TenantId,
    pub slug: String,
    pub title: String,
    pub html: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            TenantStatus::Pending,
            TenantStatus::Active,
            TenantStatus::Suspended,
        ] {
            assert_eq!(status.as_str().parse::<TenantStatus>(), Ok(status));
        }
        assert!("active".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&TenantStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }

    #[test]
    fn test_new_tenant_starts_pending() {
        let tenant = NewTenant {
            subdomain: "acme".to_string(),
            name: "Acme".to_string(),
            email: "a@acme.com".to_string(),
            phone: None,
            primary_color: None,
        }
        .into_pending();

        assert_eq!(tenant.status, TenantStatus::Pending);
        assert!(!tenant.is_active());
        assert_eq!(tenant.created_at, tenant.updated_at);
    }
}

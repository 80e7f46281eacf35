//! Tenant creation input validation

use serde::{Deserialize, Serialize};
use subsite_shared::NewTenant;

use crate::routing::{ReservedNames, MAX_LABEL_LEN};

/// Raw creation request as submitted by the signup form
///
/// Text fields default to empty so a missing field is reported alongside
/// every other problem instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTenantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub primary_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every offending field of a rejected request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} invalid field(s)", .errors.len())]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for error in &self.errors {
            if !names.contains(&error.field) {
                names.push(error.field);
            }
        }
        names
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Trim and lowercase a requested subdomain
pub fn normalize_subdomain(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Check a normalized subdomain; `Err` carries a user-facing reason
pub fn check_subdomain(subdomain: &str, reserved: &ReservedNames) -> Result<(), String> {
    if subdomain.is_empty() {
        return Err("Subdomain is required".to_string());
    }
    if subdomain.len() > MAX_LABEL_LEN {
        return Err(format!(
            "Subdomain must be at most {} characters",
            MAX_LABEL_LEN
        ));
    }
    if !subdomain
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(
            "Subdomain can only contain lowercase letters, numbers, and hyphens".to_string(),
        );
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err("Subdomain cannot start or end with a hyphen".to_string());
    }
    if reserved.is_reserved(subdomain) {
        return Err("This subdomain is reserved".to_string());
    }
    Ok(())
}

/// `#rgb` or `#rrggbb`
fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate and normalize a creation request
pub fn validate(
    request: &CreateTenantRequest,
    reserved: &ReservedNames,
) -> Result<NewTenant, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = request.name.trim().to_string();
    if name.is_empty() {
        errors.push("name", "Name is required");
    }

    let subdomain = normalize_subdomain(&request.subdomain);
    if let Err(reason) = check_subdomain(&subdomain, reserved) {
        errors.push("subdomain", reason);
    }

    let email = request.email.trim().to_string();
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !email.contains('@') {
        errors.push("email", "Email must contain '@'");
    }

    let primary_color = non_blank(request.primary_color.as_deref());
    if let Some(color) = &primary_color {
        if !is_hex_color(color) {
            errors.push("primary_color", "Color must be #rgb or #rrggbb");
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewTenant {
        subdomain,
        name,
        email,
        phone: non_blank(request.phone.as_deref()),
        primary_color,
    })
}

//! Reserved subdomain filter

use crate::config::DEFAULT_RESERVED_SUBDOMAINS;

/// Labels that belong to the main site and are never treated as tenants
#[derive(Debug, Clone)]
pub struct ReservedNames {
    names: Vec<String>,
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_SUBDOMAINS.iter().copied())
    }
}

impl ReservedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive membership test; an empty label is always reserved
    pub fn is_reserved(&self, label: &str) -> bool {
        label.is_empty() || self.names.iter().any(|name| name.eq_ignore_ascii_case(label))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserved() {
        let reserved = ReservedNames::default();
        for name in ["www", "app", "admin", "api", "dashboard"] {
            assert!(reserved.is_reserved(name), "{}", name);
        }
        assert!(!reserved.is_reserved("acme"));
        assert!(!reserved.is_reserved("mail"));
    }

    #[test]
    fn test_case_insensitive() {
        let reserved = ReservedNames::default();
        assert!(reserved.is_reserved("WWW"));
        assert!(reserved.is_reserved("Api"));
    }

    #[test]
    fn test_empty_label_is_reserved() {
        assert!(ReservedNames::default().is_reserved(""));
        assert!(ReservedNames::new(Vec::<String>::new()).is_reserved(""));
    }

    #[test]
    fn test_custom_list() {
        let reserved = ReservedNames::new(["Mail", " status ", ""]);
        assert_eq!(reserved.names(), ["mail", "status"]);
        assert!(reserved.is_reserved("mail"));
        assert!(!reserved.is_reserved("www"));
    }
}

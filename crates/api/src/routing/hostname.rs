//! Hostname parsing
//!
//! Extracts the tenant label from an inbound hostname:
//! `acme.example.com:8080` with root `example.com` -> `acme`.

/// Outcome of parsing a hostname against the root domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostLabel {
    /// Everything in front of `.{root}`, exactly as it appeared
    Label(String),
    /// The root domain itself, a foreign host, or an empty label
    NotASubdomain,
}

impl HostLabel {
    pub fn label(&self) -> Option<&str> {
        match self {
            HostLabel::Label(label) => Some(label),
            HostLabel::NotASubdomain => None,
        }
    }
}

/// Parse `hostname` against `root_domain`.
///
/// The port (if any) and one trailing dot are ignored, and the suffix match
/// is case-insensitive.
/// The label's character set is not validated here.
pub fn parse_hostname(hostname: &str, root_domain: &str) -> HostLabel {
    let host = strip_port(hostname.trim());
    // Fully-qualified form: `acme.example.com.`
    let host = host.strip_suffix('.').unwrap_or(host);
    let root = root_domain.trim_matches('.');

    if host.is_empty() || root.is_empty() || host.eq_ignore_ascii_case(root) {
        return HostLabel::NotASubdomain;
    }

    // `host` must end with ".{root}"; compare bytes so a multi-byte char
    // never lands on a slice boundary.
    let suffix_len = root.len() + 1;
    if host.len() <= suffix_len {
        return HostLabel::NotASubdomain;
    }
    let split = host.len() - suffix_len;
    let (head, tail) = host.as_bytes().split_at(split);
    if tail[0] != b'.' || !tail[1..].eq_ignore_ascii_case(root.as_bytes()) {
        return HostLabel::NotASubdomain;
    }

    match std::str::from_utf8(head) {
        Ok(label) if !label.is_empty() => HostLabel::Label(label.to_string()),
        _ => HostLabel::NotASubdomain,
    }
}

/// Remove a `:port` suffix. Bracketed IPv6 literals are returned with the
/// brackets kept so they can never match a root domain.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

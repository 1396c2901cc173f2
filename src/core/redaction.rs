//! Sensitive data redaction for captured headers and bodies
//!
//! This module masks configured headers, makes JWT-shaped header values
//! readable, and decides when a body must not be captured at all.

use actix_web::http::Method;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Redacted value placeholder
pub const REDACTED: &str = "██";

/// Mask a value.
///
/// Every non-empty input maps to the same token so the length is not leaked.
pub fn redact(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        REDACTED.to_string()
    }
}

/// Decode the header and payload segments of a JWT for readability.
///
/// An auth-scheme prefix such as `Bearer ` is preserved. Values that do not
/// look like a JWT, or whose segments are not valid base64url, are returned
/// unchanged. The signature segment is never touched.
pub fn decode_jwt_header(value: &str) -> String {
    let (scheme, token) = match value.split_once(' ') {
        Some((scheme, token)) if !scheme.is_empty() => (Some(scheme), token),
        _ => (None, value),
    };

    let parts: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = parts.as_slice() else {
        return value.to_string();
    };

    let (Some(header), Some(payload)) = (base64_decode(header), base64_decode(payload)) else {
        return value.to_string();
    };

    let decoded = format!("{}.{}.{}", header, payload, signature);
    match scheme {
        Some(scheme) => format!("{} {}", scheme, decoded),
        None => decoded,
    }
}

fn base64_decode(segment: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    String::from_utf8(bytes).ok()
}

/// Header-level redaction policy
#[derive(Debug, Clone, Default)]
pub struct HeaderPolicy {
    /// Header names whose values are masked
    pub redacts: Vec<String>,
    /// Header names whose values are JWT-decoded
    pub jwt_headers: Vec<String>,
}

impl HeaderPolicy {
    /// Create a policy from the configured name lists
    pub fn new(redacts: Vec<String>, jwt_headers: Vec<String>) -> Self {
        Self {
            redacts,
            jwt_headers,
        }
    }

    /// Apply the policy to every value of one header.
    ///
    /// Masking wins over JWT decoding when a name is in both lists.
    pub fn apply(&self, name: &str, values: Vec<String>) -> Vec<String> {
        if contains_ignore_case(&self.redacts, name) {
            values.iter().map(|v| redact(v)).collect()
        } else if contains_ignore_case(&self.jwt_headers, name) {
            values.iter().map(|v| decode_jwt_header(v)).collect()
        } else {
            values
        }
    }
}

/// Case-insensitive substring match of `value` against every entry
pub fn contains_ignore_case(entries: &[String], value: &str) -> bool {
    let value = value.to_lowercase();
    entries
        .iter()
        .any(|entry| entry.to_lowercase().contains(&value))
}

/// Body capture suppression rules (`METHOD /path` prefixes)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyRedactRules {
    rules: Vec<String>,
}

impl BodyRedactRules {
    /// Parse a `;`-separated rule list; empty rules are dropped
    pub fn parse(rules: &str) -> Self {
        Self {
            rules: rules
                .split(';')
                .map(str::trim)
                .filter(|rule| !rule.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether the request matches any rule
    pub fn matches(&self, method: &Method, url: &str) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let request_line = format!("{} {}", method, url);
        self.rules.iter().any(|rule| request_line.starts_with(rule))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

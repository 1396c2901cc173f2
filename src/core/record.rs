//! Immutable snapshot of one observed HTTP exchange

use super::decoder::BodyDecoder;
use super::redaction::HeaderPolicy;
use actix_web::http::header::HeaderMap;
use actix_web::http::{Method, StatusCode};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Header map as rendered: canonical names, values in arrival order
pub type CapturedHeaders = BTreeMap<String, Vec<String>>;

/// Everything known about one exchange once the response has finished
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub system: String,
    pub proto: String,
    pub method: Method,
    pub url: String,
    pub remote_addr: String,
    pub status: StatusCode,
    pub request_headers: CapturedHeaders,
    pub request_body: Bytes,
    pub request_decoder: BodyDecoder,
    pub response_headers: CapturedHeaders,
    pub response_body: Bytes,
    pub response_decoder: BodyDecoder,
    /// Bytes written to the client, counted even when the body was not captured
    pub response_content_length: usize,
    pub duration_ms: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl CaptureRecord {
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or_default()
    }

    /// `METHOD URL PROTO STATUS` summary line
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {}",
            self.method,
            self.url,
            self.proto,
            self.status.as_u16()
        )
    }

    /// Decoded request body, empty when not captured or undecodable
    pub fn request_text(&self) -> String {
        self.request_decoder.decode_or_empty(&self.request_body)
    }

    /// Decoded response body, empty when not captured or undecodable
    pub fn response_text(&self) -> String {
        self.response_decoder.decode_or_empty(&self.response_body)
    }
}

/// Canonical MIME header key: `content-type` becomes `Content-Type`
pub fn canonical_header_key(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Copy headers through the redaction policy.
///
/// Silent mode yields an empty map. Values that are not visible ASCII are
/// rendered lossily.
pub fn capture_headers(headers: &HeaderMap, policy: &HeaderPolicy, silent: bool) -> CapturedHeaders {
    let mut captured = CapturedHeaders::new();
    if silent {
        return captured;
    }

    for (name, value) in headers.iter() {
        captured
            .entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    captured
        .into_iter()
        .map(|(name, values)| {
            let values = policy.apply(&name, values);
            (name, values)
        })
        .collect()
}

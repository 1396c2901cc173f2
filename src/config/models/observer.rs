//! Root observer configuration

use super::*;
use crate::logger::LogFormat;
use serde::{Deserialize, Serialize};

/// Observer configuration, read from YAML with camelCase keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverConfig {
    /// Disabled observers pass every exchange through untouched
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log the effective configuration at startup
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Attach a random `logId` to JSON records
    #[serde(default = "default_true")]
    pub generate_log_id: bool,
    /// System label carried by every record
    #[serde(default = "default_name")]
    pub name: String,
    /// Capture response bodies when the request accepts anything
    #[serde(default)]
    pub accept_any: bool,
    /// Do not capture headers at all
    #[serde(default)]
    pub silent_headers: bool,
    /// Content-type substrings whose bodies are captured; empty means all
    #[serde(default)]
    pub body_content_types: Vec<String>,
    /// Headers whose values are JWT-decoded
    #[serde(default)]
    pub jwt_headers: Vec<String>,
    /// Headers whose values are masked
    #[serde(default)]
    pub header_redacts: Vec<String>,
    /// `;`-separated `METHOD /path` prefixes without request body capture
    #[serde(default)]
    pub request_body_redact: String,
    /// `;`-separated `METHOD /path` prefixes without response body capture
    #[serde(default)]
    pub response_body_redact: String,
    #[serde(default)]
    pub langfuse: Option<LangfuseConfig>,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
            log_format: LogFormat::Text,
            generate_log_id: true,
            name: default_name(),
            accept_any: false,
            silent_headers: false,
            body_content_types: Vec::new(),
            jwt_headers: Vec::new(),
            header_redacts: Vec::new(),
            request_body_redact: String::new(),
            response_body_redact: String::new(),
            langfuse: None,
            delivery: DeliveryConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

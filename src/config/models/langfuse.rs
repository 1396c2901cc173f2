//! Ingestion sink connection settings

use super::*;
use serde::{Deserialize, Serialize};

/// Langfuse API endpoint and credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LangfuseConfig {
    pub base_url: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cloud.langfuse.com".to_string(),
            public_key: String::new(),
            secret_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

// The secret key never reaches the logs
impl std::fmt::Debug for LangfuseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangfuseConfig")
            .field("base_url", &self.base_url)
            .field("public_key", &self.public_key)
            .field("secret_key", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

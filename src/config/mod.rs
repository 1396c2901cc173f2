//! Configuration management for the observer
//!
//! This module handles loading, environment overrides and validation of the
//! observer configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{ObserverError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable overriding `langfuse.baseUrl`
pub const ENV_LANGFUSE_BASE_URL: &str = "LANGFUSE_BASE_URL";
/// Environment variable overriding `langfuse.publicKey`
pub const ENV_LANGFUSE_PUBLIC_KEY: &str = "LANGFUSE_PUBLIC_KEY";
/// Environment variable overriding `langfuse.secretKey`
pub const ENV_LANGFUSE_SECRET_KEY: &str = "LANGFUSE_SECRET_KEY";

impl ObserverConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ObserverError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?.with_env_overrides();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ObserverError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self::default().with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply sink credentials from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply sink credentials looked up through `lookup`.
    ///
    /// A `langfuse` block is created when any credential is present.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(ENV_LANGFUSE_BASE_URL);
        let public_key = lookup(ENV_LANGFUSE_PUBLIC_KEY);
        let secret_key = lookup(ENV_LANGFUSE_SECRET_KEY);

        if base_url.is_none() && public_key.is_none() && secret_key.is_none() {
            return self;
        }

        let langfuse = self.langfuse.get_or_insert_with(LangfuseConfig::default);
        if let Some(base_url) = base_url {
            langfuse.base_url = base_url;
        }
        if let Some(public_key) = public_key {
            langfuse.public_key = public_key;
        }
        if let Some(secret_key) = secret_key {
            langfuse.secret_key = secret_key;
        }
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ObserverError::Config)
    }
}

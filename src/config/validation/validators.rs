//! Section validators

use super::Validate;
use crate::config::models::*;
use crate::logger::LogFormat;
use tracing::debug;
use url::Url;

impl Validate for ObserverConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating observer configuration");

        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }

        if self.enabled && self.log_format == LogFormat::Langfuse {
            let langfuse = self
                .langfuse
                .as_ref()
                .ok_or_else(|| "logFormat langfuse requires a langfuse block".to_string())?;
            langfuse.validate()?;
            self.delivery.validate()?;
        }

        self.server.validate()?;
        Ok(())
    }
}

impl Validate for LangfuseConfig {
    fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid langfuse baseUrl '{}': {}", self.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "langfuse baseUrl must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if self.public_key.is_empty() || self.secret_key.is_empty() {
            return Err("langfuse publicKey and secretKey are required".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("langfuse timeoutSecs must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for DeliveryConfig {
    fn validate(&self) -> Result<(), String> {
        let fields = [
            ("queueCapacity", self.queue_capacity as u64),
            ("maxAttempts", u64::from(self.max_attempts)),
            ("initialBackoffMs", self.initial_backoff_ms),
            ("probeIntervalMs", self.probe_interval_ms),
            ("healthCheckTimeoutMs", self.health_check_timeout_ms),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(format!("delivery {} must be greater than 0", name));
            }
        }

        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(0) = self.workers {
            return Err("Server workers must be greater than 0".to_string());
        }

        Ok(())
    }
}

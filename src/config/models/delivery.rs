//! Delivery pipeline tunables

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Send attempts per record, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles afterwards
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Explicit health checks are suppressed this long after a failure
    #[serde(default = "default_health_cooldown_ms")]
    pub health_cooldown_ms: u64,
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_health_check_timeout_ms")]
    pub health_check_timeout_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            health_cooldown_ms: default_health_cooldown_ms(),
            probe_interval_ms: default_probe_interval_ms(),
            health_check_timeout_ms: default_health_check_timeout_ms(),
        }
    }
}

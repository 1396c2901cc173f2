//! Sink health state machine
//!
//! Healthy until a send fails, then Probing until a send or an explicit
//! health check succeeds. Only the two transition methods mutate state.

use parking_lot::RwLock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Snapshot of sink health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthState {
    pub healthy: bool,
    /// When the most recent send failure happened
    pub last_error: Option<Instant>,
    /// Always implies `!healthy`
    pub probing: bool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            healthy: true,
            last_error: None,
            probing: false,
        }
    }
}

impl HealthState {
    /// Whether the last failure is more recent than `cooldown`
    pub fn in_cooldown(&self, cooldown: Duration) -> bool {
        self.last_error.is_some_and(|at| at.elapsed() < cooldown)
    }
}

/// Shared health state behind a reader/writer lock
#[derive(Debug, Default)]
pub struct HealthMonitor {
    state: RwLock<HealthState>,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A send failed: enter Probing and remember when
    pub fn mark_unhealthy(&self) {
        let mut state = self.state.write();
        state.healthy = false;
        state.probing = true;
        state.last_error = Some(Instant::now());
    }

    /// A send or health check succeeded: back to Healthy
    pub fn mark_healthy(&self) {
        let mut state = self.state.write();
        if state.probing {
            info!("Ingestion sink recovered, leaving probe mode");
        }
        state.healthy = true;
        state.probing = false;
    }

    pub fn snapshot(&self) -> HealthState {
        *self.state.read()
    }

    pub fn is_probing(&self) -> bool {
        self.state.read().probing
    }
}

//! Configuration data models

pub mod delivery;
pub mod langfuse;
pub mod observer;
pub mod server;

pub use delivery::*;
pub use langfuse::*;
pub use observer::*;
pub use server::*;

pub fn default_true() -> bool {
    true
}

/// Default system label
pub fn default_name() -> String {
    "HTTP".to_string()
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8080
}

/// Default sink request timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

pub fn default_queue_capacity() -> usize {
    1000
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_initial_backoff_ms() -> u64 {
    1000
}

pub fn default_health_cooldown_ms() -> u64 {
    5000
}

pub fn default_probe_interval_ms() -> u64 {
    10_000
}

pub fn default_health_check_timeout_ms() -> u64 {
    5000
}

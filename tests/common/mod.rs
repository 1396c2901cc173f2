//! Common test utilities for httpscope
//!
//! - Fixed clock and id generator so rendered records are deterministic
//! - Record and configuration factories
//! - A recording [`SinkClient`](httpscope::SinkClient) double
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{fixtures, test_observer};
//!
//! let (observer, writer) = test_observer(fixtures::json_config());
//! ```

pub mod fixtures;

pub use fixtures::{ConfigFactory, RecordFactory};
pub use sink::RecordingSink;

use chrono::{DateTime, TimeZone, Utc};
use httpscope::logger::MemoryWriter;
use httpscope::utils::{FixedClock, FixedIdGenerator};
use httpscope::{Observer, ObserverConfig};
use std::sync::Arc;

/// Log id produced by every test observer
pub const TEST_LOG_ID: &str = "test-id";

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}

/// 2020-12-15T13:30:40.999Z
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 12, 15, 13, 30, 40).unwrap() + chrono::Duration::milliseconds(999)
}

/// Observer with a frozen clock and constant ids writing into memory
pub fn test_observer(config: ObserverConfig) -> (Arc<Observer>, Arc<MemoryWriter>) {
    let writer = Arc::new(MemoryWriter::new());
    let observer = Observer::builder(config)
        .clock(Arc::new(FixedClock(fixed_time())))
        .id_generator(Arc::new(FixedIdGenerator(TEST_LOG_ID.to_string())))
        .writer(writer.clone())
        .build()
        .expect("observer should build");
    (Arc::new(observer), writer)
}

/// Parse every JSON record the writer received
pub fn json_records(writer: &MemoryWriter) -> Vec<serde_json::Value> {
    writer
        .entries()
        .iter()
        .map(|entry| serde_json::from_str(entry).expect("record should be JSON"))
        .collect()
}

//! Utility modules for the observer
//!
//! - **error**: crate error type and result alias
//! - **clock**: wall-clock source used for record timestamps
//! - **ids**: log, trace and span identifier generation

pub mod clock;
pub mod error;
pub mod ids;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ObserverError, Result};
pub use ids::{EmptyIdGenerator, FixedIdGenerator, IdGenerator, RandomIdGenerator};

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp the way every rendered record and ingestion event does
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds between two instants with microsecond resolution
pub fn duration_ms(start: &DateTime<Utc>, end: &DateTime<Utc>) -> f64 {
    let micros = end
        .signed_duration_since(*start)
        .num_microseconds()
        .unwrap_or_default();
    micros as f64 / 1000.0
}

//! Record renderers
//!
//! An [`HttpLogger`] receives every finished [`CaptureRecord`]. The text and
//! JSON loggers render it to a [`LogWriter`]; the delivery pipeline ships it
//! to the ingestion sink instead.

pub mod json;
pub mod text;
pub mod writer;

pub use json::JsonLogger;
pub use text::TextLogger;
pub use writer::{LogWriter, MemoryWriter, StdoutWriter};

use crate::core::record::CaptureRecord;
use serde::{Deserialize, Serialize};

/// Logger strategy selected by `logFormat`
pub trait HttpLogger: Send + Sync {
    /// Consume one record. Must not block the request path or fail.
    fn print(&self, record: CaptureRecord);

    /// Release background resources
    fn close(&self) {}
}

/// Output format of capture records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    /// Ship records to a Langfuse-compatible ingestion API
    Langfuse,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Langfuse => write!(f, "langfuse"),
        }
    }
}

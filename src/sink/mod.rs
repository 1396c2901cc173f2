//! Trace ingestion sink
//!
//! [`SinkClient`] is the seam between the delivery pipeline and the external
//! ingestion service. [`LangfuseClient`] talks to a Langfuse-compatible API.

pub mod client;
pub mod types;

pub use client::LangfuseClient;
pub use types::*;

use crate::utils::error::Result;
use async_trait::async_trait;

/// Operations the delivery pipeline needs from an ingestion service
#[async_trait]
pub trait SinkClient: Send + Sync {
    /// Probe the service; status `"OK"` means healthy
    async fn health(&self) -> Result<HealthResponse>;

    /// Submit a batch of events.
    ///
    /// Partial success is `Ok`; rejected events are listed in the response.
    async fn ingest(&self, request: &IngestionRequest) -> Result<IngestionResponse>;
}

//! Delivery of capture records to the ingestion sink
//!
//! - **queue**: bounded drop-oldest FIFO between handlers and the worker
//! - **health**: Healthy / Probing state machine
//! - **pipeline**: consumer, retry with backoff, health prober
//! - **events**: record to ingestion batch translation

pub mod events;
pub mod health;
pub mod pipeline;
pub mod queue;

pub use events::{EVENT_SOURCE, EventBuilder};
pub use health::{HealthMonitor, HealthState};
pub use pipeline::{DeliveryPipeline, DeliverySettings};
pub use queue::{DeliveryQueue, PushOutcome};

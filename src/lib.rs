//! # httpscope
//!
//! Transparent observation of HTTP exchanges. Every request/response pair
//! passing through the observer is captured into a record with headers,
//! decoded bodies and timing, after redaction, and handed to a logger:
//!
//! - **text**: human readable multi-line block
//! - **json**: single-line ECS-style object
//! - **langfuse**: asynchronous trace delivery to an ingestion API with
//!   bounded queueing, retries and health probing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use httpscope::{ObserverConfig, Observer, server::middleware::ObserverMiddleware};
//! use actix_web::{App, HttpServer, web};
//! use std::sync::Arc;
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ObserverConfig::from_file("config/httpscope.yaml").await?;
//!     let observer = Arc::new(Observer::builder(config).build()?);
//!
//!     let app_observer = observer.clone();
//!     HttpServer::new(move || {
//!         App::new()
//!             .wrap(ObserverMiddleware::new(app_observer.clone()))
//!             .route("/", web::get().to(|| async { "hello" }))
//!     })
//!     .bind("127.0.0.1:8080")?
//!     .run()
//!     .await?;
//!
//!     observer.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod delivery;
pub mod logger;
pub mod server;
pub mod sink;
pub mod utils;

// Re-export main types
pub use config::ObserverConfig;
pub use core::{CaptureRecord, Observer, ObserverBuilder};
pub use delivery::DeliveryPipeline;
pub use logger::{HttpLogger, LogFormat};
pub use sink::{LangfuseClient, SinkClient};
pub use utils::error::{ObserverError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Error handling for the observer
//!
//! This module defines all error types used throughout the crate.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the observer
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Main error type for the observer
#[derive(Error, Debug)]
pub enum ObserverError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Body decompression errors
    #[error("Failed to decode {encoding} body: {source}")]
    Decode {
        encoding: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Sink answered the health check with an error status
    #[error("Health check failed with status {status}: {body}")]
    HealthCheck { status: u16, body: String },

    /// Sink rejected an ingestion batch
    #[error("Ingestion failed with status {status}: {body}")]
    Ingestion { status: u16, body: String },

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Operation aborted because the pipeline is shutting down
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// The wrapped response writer cannot hand over its connection
    #[error("{0} is not a hijacker")]
    NotAHijacker(&'static str),

    /// The wrapped response writer cannot push resources
    #[error("feature not supported: server push")]
    PushNotSupported,
}

impl ObserverError {
    /// Whether the error reflects a missing transport capability
    pub fn is_capability_error(&self) -> bool {
        matches!(
            self,
            ObserverError::NotAHijacker(_) | ObserverError::PushNotSupported
        )
    }
}

impl ResponseError for ObserverError {
    fn status_code(&self) -> StatusCode {
        match self {
            ObserverError::NotAHijacker(_) | ObserverError::PushNotSupported => {
                StatusCode::NOT_IMPLEMENTED
            }
            ObserverError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ObserverError::HealthCheck { .. } | ObserverError::Ingestion { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            ObserverError::NotAHijacker(_) => ("NOT_A_HIJACKER", self.to_string()),
            ObserverError::PushNotSupported => ("PUSH_NOT_SUPPORTED", self.to_string()),
            ObserverError::Timeout(_) => ("TIMEOUT", self.to_string()),
            ObserverError::HealthCheck { .. } | ObserverError::Ingestion { .. } => {
                ("SINK_ERROR", self.to_string())
            }
            _ => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }))
    }
}

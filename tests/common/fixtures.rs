//! Test fixtures and data factories

use actix_web::http::{Method, StatusCode};
use bytes::Bytes;
use chrono::{Duration, Utc};
use httpscope::config::{DeliveryConfig, LangfuseConfig};
use httpscope::core::{BodyDecoder, CaptureRecord, CapturedHeaders};
use httpscope::{LogFormat, ObserverConfig};

/// Factory for observer configurations
pub struct ConfigFactory;

impl ConfigFactory {
    pub fn text() -> ObserverConfig {
        ObserverConfig::default()
    }

    pub fn json() -> ObserverConfig {
        ObserverConfig {
            log_format: LogFormat::Json,
            ..ObserverConfig::default()
        }
    }

    /// Langfuse format pointed at `base_url` with fast retries
    pub fn langfuse(base_url: &str) -> ObserverConfig {
        ObserverConfig {
            log_format: LogFormat::Langfuse,
            langfuse: Some(LangfuseConfig {
                base_url: base_url.to_string(),
                public_key: "pk-lf-test".to_string(),
                secret_key: "sk-lf-test".to_string(),
                timeout_secs: 5,
            }),
            delivery: DeliveryConfig {
                max_attempts: 2,
                initial_backoff_ms: 10,
                health_cooldown_ms: 50,
                probe_interval_ms: 20,
                ..DeliveryConfig::default()
            },
            ..ObserverConfig::default()
        }
    }
}

/// Factory for finished capture records
pub struct RecordFactory;

impl RecordFactory {
    /// `POST /double` answered with `200 OK`
    pub fn double(request: &str, response: &str) -> CaptureRecord {
        let ended_at = Utc::now();
        let started_at = ended_at - Duration::milliseconds(3);

        let mut request_headers = CapturedHeaders::new();
        request_headers.insert("Content-Type".to_string(), vec!["text/plain".to_string()]);
        let mut response_headers = CapturedHeaders::new();
        response_headers.insert("Content-Type".to_string(), vec!["text/plain".to_string()]);

        CaptureRecord {
            system: "HTTP".to_string(),
            proto: "HTTP/1.1".to_string(),
            method: Method::POST,
            url: "/double".to_string(),
            remote_addr: "127.0.0.1:50000".to_string(),
            status: StatusCode::OK,
            request_headers,
            request_body: Bytes::copy_from_slice(request.as_bytes()),
            request_decoder: BodyDecoder::Identity,
            response_headers,
            response_content_length: response.len(),
            response_body: Bytes::copy_from_slice(response.as_bytes()),
            response_decoder: BodyDecoder::Identity,
            duration_ms: 3.0,
            started_at,
            ended_at,
        }
    }
}

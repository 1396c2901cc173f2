//! Translation of capture records into ingestion batches

use crate::core::record::CaptureRecord;
use crate::sink::types::{
    IngestionEvent, IngestionRequest, ObservationBody, ObservationLevel, ObservationType, TraceBody,
};
use crate::utils::{IdGenerator, format_timestamp};
use serde_json::json;
use std::sync::Arc;

/// Value of the `source` batch metadata field
pub const EVENT_SOURCE: &str = "httpscope";

/// Builds one trace plus one span per record
pub struct EventBuilder {
    ids: Arc<dyn IdGenerator>,
}

impl EventBuilder {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn build(&self, record: &CaptureRecord) -> IngestionRequest {
        let request_body = record.request_text();
        let response_body = record.response_text();

        let session_id = self.ids.generate();
        let trace_id = self.ids.generate();
        let span_id = self.ids.generate();
        let start = format_timestamp(&record.started_at);
        let end = format_timestamp(&record.ended_at);
        let name = format!("{}: {} {}", record.system, record.method, record.url);
        let status = record.status.as_u16();

        let trace = TraceBody {
            id: Some(trace_id.clone()),
            timestamp: Some(start.clone()),
            name: Some(name.clone()),
            input: Some(json!({
                "url": record.url,
                "body": request_body,
            })),
            output: Some(json!({
                "statusCode": status,
                "responseBody": response_body,
            })),
            session_id: Some(session_id),
            tags: vec![
                "http".to_string(),
                record.system.clone(),
                record.method.to_string(),
                format!("status_{}", status),
            ],
            ..Default::default()
        };

        let span = ObservationBody {
            id: Some(span_id.clone()),
            trace_id: Some(trace_id.clone()),
            observation_type: ObservationType::Span,
            name: Some(name),
            start_time: Some(start.clone()),
            end_time: Some(end),
            input: Some(json!({
                "method": record.method.as_str(),
                "url": record.url,
                "proto": record.proto,
                "remoteAddr": record.remote_addr,
                "headers": record.request_headers,
                "body": request_body,
            })),
            output: Some(json!({
                "statusCode": status,
                "statusText": record.status_text(),
                "responseHeaders": record.response_headers,
                "responseBody": response_body,
                "responseContentLength": record.response_content_length,
                "durationMs": record.duration_ms,
            })),
            level: Some(ObservationLevel::Default),
            ..Default::default()
        };

        IngestionRequest {
            batch: vec![
                IngestionEvent::trace_create(trace_id, start.clone(), &trace),
                IngestionEvent::span_create(span_id, start, &span),
            ],
            metadata: Some(json!({
                "source": EVENT_SOURCE,
                "system": record.system,
            })),
        }
    }
}

//! ECS-flavoured single-line JSON record format

use super::{HttpLogger, LogWriter};
use crate::core::record::{CaptureRecord, CapturedHeaders};
use crate::utils::{Clock, IdGenerator, Result, format_timestamp};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

const ECS_VERSION: &str = "1.6.0";

#[derive(Debug, Serialize)]
struct JsonLogLine<'a> {
    #[serde(rename = "log.level")]
    level: &'static str,
    #[serde(rename = "@timestamp")]
    timestamp: String,
    message: String,
    #[serde(rename = "systemName", skip_serializing_if = "str::is_empty")]
    system: &'a str,
    #[serde(rename = "remoteAddress", skip_serializing_if = "str::is_empty")]
    remote_addr: &'a str,
    method: &'a str,
    path: &'a str,
    status: u16,
    #[serde(rename = "statusText")]
    status_text: &'static str,
    proto: &'a str,
    #[serde(rename = "durationMs")]
    duration_ms: f64,
    #[serde(rename = "requestHeaders", skip_serializing_if = "CapturedHeaders::is_empty")]
    request_headers: &'a CapturedHeaders,
    #[serde(rename = "requestBody", skip_serializing_if = "String::is_empty")]
    request_body: String,
    #[serde(rename = "responseHeaders", skip_serializing_if = "CapturedHeaders::is_empty")]
    response_headers: &'a CapturedHeaders,
    #[serde(rename = "responseContentLength")]
    response_content_length: usize,
    #[serde(rename = "responseBody", skip_serializing_if = "String::is_empty")]
    response_body: String,
    #[serde(rename = "ecs.version")]
    ecs_version: &'static str,
    #[serde(rename = "logId", skip_serializing_if = "String::is_empty")]
    log_id: String,
}

/// Renders records as newline-terminated JSON objects
pub struct JsonLogger {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    writer: Arc<dyn LogWriter>,
}

impl JsonLogger {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, writer: Arc<dyn LogWriter>) -> Self {
        Self { clock, ids, writer }
    }

    /// Render one record, including the trailing newline
    pub fn render(&self, record: &CaptureRecord) -> Result<String> {
        let line = JsonLogLine {
            level: "info",
            timestamp: format_timestamp(&self.clock.now()),
            message: record.summary(),
            system: &record.system,
            remote_addr: &record.remote_addr,
            method: record.method.as_str(),
            path: &record.url,
            status: record.status.as_u16(),
            status_text: record.status_text(),
            proto: &record.proto,
            duration_ms: record.duration_ms,
            request_headers: &record.request_headers,
            request_body: record.request_text(),
            response_headers: &record.response_headers,
            response_content_length: record.response_content_length,
            response_body: record.response_text(),
            ecs_version: ECS_VERSION,
            log_id: self.ids.generate(),
        };

        let mut text = serde_json::to_string(&line)?;
        text.push('\n');
        Ok(text)
    }
}

impl HttpLogger for JsonLogger {
    fn print(&self, record: CaptureRecord) {
        let text = match self.render(&record) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize capture record: {}", e);
                return;
            }
        };

        if let Err(e) = self.writer.write(&text) {
            error!("Failed to write capture record: {}", e);
        }
    }
}

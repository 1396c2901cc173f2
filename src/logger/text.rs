//! Human-readable multi-line record format

use super::{HttpLogger, LogWriter};
use crate::core::record::{CaptureRecord, CapturedHeaders};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::error;

/// Renders records as plain text blocks
pub struct TextLogger {
    writer: Arc<dyn LogWriter>,
}

impl TextLogger {
    pub fn new(writer: Arc<dyn LogWriter>) -> Self {
        Self { writer }
    }

    /// Render one record
    pub fn render(record: &CaptureRecord) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} {} {}: {} {} {}",
            record.remote_addr,
            record.method,
            record.url,
            record.status.as_u16(),
            record.status_text(),
            record.proto
        );

        if !record.request_headers.is_empty() {
            out.push_str("\nRequest Headers:\n");
            write_headers(&mut out, &record.request_headers);
        }

        if !record.request_body.is_empty() {
            out.push_str("\nRequest Body:\n");
            out.push_str(&record.request_text());
            out.push('\n');
        }

        if !record.response_headers.is_empty() {
            out.push_str("\nResponse Headers:\n");
            write_headers(&mut out, &record.response_headers);
        }

        let _ = writeln!(
            out,
            "\nResponse Content Length: {}",
            record.response_content_length
        );
        let _ = writeln!(out, "\nDuration: {:.3} ms", record.duration_ms);

        if !record.response_body.is_empty() {
            out.push_str("\nResponse Body:\n");
            out.push_str(&record.response_text());
            out.push('\n');
        }

        out.push('\n');
        out
    }
}

fn write_headers(out: &mut String, headers: &CapturedHeaders) {
    // BTreeMap iterates in sorted key order
    for (name, values) in headers {
        let _ = writeln!(out, "{}: {}", name, values.join(","));
    }
}

impl HttpLogger for TextLogger {
    fn print(&self, record: CaptureRecord) {
        let text = Self::render(&record);
        if let Err(e) = self.writer.write(&text) {
            error!("Failed to write capture record: {}", e);
        }
    }
}

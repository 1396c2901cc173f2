//! Per-exchange capture decisions and record assembly

use super::capture::{
    CaptureBuffer, CaptureReader, CaptureWriter, ResponseCapture, ResponseWriter,
    new_capture_buffer,
};
use super::decoder::BodyDecoder;
use super::record::{CaptureRecord, CapturedHeaders, capture_headers};
use super::redaction::{BodyRedactRules, HeaderPolicy};
use crate::config::ObserverConfig;
use crate::delivery::{DeliveryPipeline, DeliverySettings, EventBuilder};
use crate::logger::{HttpLogger, JsonLogger, LogFormat, LogWriter, StdoutWriter, TextLogger};
use crate::sink::{LangfuseClient, SinkClient};
use crate::utils::error::{ObserverError, Result};
use crate::utils::{
    Clock, EmptyIdGenerator, IdGenerator, RandomIdGenerator, SystemClock, duration_ms,
};
use actix_web::http::header::{self, HeaderMap};
use actix_web::http::{Method, Uri, Version};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

const EVENT_STREAM: &str = "text/event-stream";
const GRPC_WEB_PREFIX: &str = "application/grpc-web";

/// Request half of an exchange handed to [`Observer::serve`]
#[derive(Debug)]
pub struct ExchangeRequest<B> {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub remote_addr: String,
    pub body: B,
}

impl<B> ExchangeRequest<B> {
    pub fn new(method: Method, uri: Uri, body: B) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            remote_addr: String::new(),
            body,
        }
    }

    fn map_body<T>(self, f: impl FnOnce(B) -> T) -> ExchangeRequest<T> {
        ExchangeRequest {
            method: self.method,
            uri: self.uri,
            version: self.version,
            headers: self.headers,
            remote_addr: self.remote_addr,
            body: f(self.body),
        }
    }
}

/// State of one intercepted exchange between request start and completion
#[derive(Debug)]
pub struct Exchange {
    method: Method,
    url: String,
    proto: String,
    remote_addr: String,
    request_headers: CapturedHeaders,
    request_decoder: BodyDecoder,
    request_buffer: Option<CaptureBuffer>,
    capture_response_body: bool,
    started_at: DateTime<Utc>,
}

impl Exchange {
    /// Wrap the request body so consumed bytes are recorded when permitted
    pub fn wrap_reader<R>(&self, body: R) -> CaptureReader<R> {
        CaptureReader::new(body, self.request_buffer.clone())
    }

    /// Fresh response capture state for this exchange
    pub fn response_capture(&self) -> ResponseCapture {
        ResponseCapture::new(self.capture_response_body)
    }

    pub fn captures_request_body(&self) -> bool {
        self.request_buffer.is_some()
    }

    pub fn captures_response_body(&self) -> bool {
        self.capture_response_body
    }
}

/// Decides what to capture for each exchange and hands finished records
/// to the configured logger
pub struct Observer {
    enabled: bool,
    name: String,
    accept_any: bool,
    silent_headers: bool,
    body_content_types: Vec<String>,
    header_policy: HeaderPolicy,
    request_body_redact: BodyRedactRules,
    response_body_redact: BodyRedactRules,
    logger: Arc<dyn HttpLogger>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("enabled", &self.enabled)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Observer {
    pub fn builder(config: ObserverConfig) -> ObserverBuilder {
        ObserverBuilder::new(config)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an exchange must pass through untouched
    pub fn should_bypass(headers: &HeaderMap) -> bool {
        if headers.contains_key(header::UPGRADE) {
            return true;
        }
        let accept = header_str(headers, header::ACCEPT);
        accept == EVENT_STREAM || accept.starts_with(GRPC_WEB_PREFIX)
    }

    /// Start observing a request.
    ///
    /// Returns `None` when the observer is disabled or the exchange is one
    /// that must bypass interception. Body capture decisions are final.
    pub fn begin(
        &self,
        method: &Method,
        uri: &Uri,
        version: Version,
        headers: &HeaderMap,
        remote_addr: &str,
    ) -> Option<Exchange> {
        if !self.enabled || Self::should_bypass(headers) {
            return None;
        }

        let url = uri.to_string();
        let capture_request_body = !self.request_body_redact.matches(method, &url)
            && self.needs_body(header_str(headers, header::CONTENT_TYPE), false);
        let capture_response_body = !self.response_body_redact.matches(method, &url)
            && self.needs_body(header_str(headers, header::ACCEPT), self.accept_any);

        Some(Exchange {
            method: method.clone(),
            proto: format!("{:?}", version),
            remote_addr: remote_addr.to_string(),
            request_headers: capture_headers(headers, &self.header_policy, self.silent_headers),
            request_decoder: BodyDecoder::for_encoding(header_str(
                headers,
                header::CONTENT_ENCODING,
            )),
            request_buffer: capture_request_body.then(new_capture_buffer),
            capture_response_body,
            started_at: self.clock.now(),
            url,
        })
    }

    /// Finish an exchange and hand the record to the logger
    pub fn complete(
        &self,
        exchange: Exchange,
        response_headers: &HeaderMap,
        capture: ResponseCapture,
    ) {
        let record = self.assemble(exchange, response_headers, capture);
        debug!(
            method = %record.method,
            url = %record.url,
            status = record.status.as_u16(),
            "Captured exchange"
        );
        self.logger.print(record);
    }

    /// Build the immutable record for a finished exchange
    pub fn assemble(
        &self,
        exchange: Exchange,
        response_headers: &HeaderMap,
        capture: ResponseCapture,
    ) -> CaptureRecord {
        let ended_at = self.clock.now();
        let request_body = exchange
            .request_buffer
            .map(|buffer| buffer.take().freeze())
            .unwrap_or_default();

        CaptureRecord {
            system: self.name.clone(),
            proto: exchange.proto,
            method: exchange.method,
            url: exchange.url,
            remote_addr: exchange.remote_addr,
            status: capture.status(),
            request_headers: exchange.request_headers,
            request_body,
            request_decoder: exchange.request_decoder,
            response_headers: capture_headers(
                response_headers,
                &self.header_policy,
                self.silent_headers,
            ),
            response_decoder: BodyDecoder::for_encoding(header_str(
                response_headers,
                header::CONTENT_ENCODING,
            )),
            response_content_length: capture.content_length(),
            response_body: capture.into_body(),
            duration_ms: duration_ms(&exchange.started_at, &ended_at),
            started_at: exchange.started_at,
            ended_at,
        }
    }

    /// Run `handler` with observing wrappers around the body and writer.
    ///
    /// The record is emitted once the handler returns. Bypassed exchanges
    /// receive the original writer and an unrecording reader.
    pub fn serve<B, W, F, T>(&self, request: ExchangeRequest<B>, mut writer: W, handler: F) -> T
    where
        W: ResponseWriter,
        F: FnOnce(ExchangeRequest<CaptureReader<B>>, &mut dyn ResponseWriter) -> T,
    {
        let exchange = self.begin(
            &request.method,
            &request.uri,
            request.version,
            &request.headers,
            &request.remote_addr,
        );

        let Some(exchange) = exchange else {
            let request = request.map_body(|body| CaptureReader::new(body, None));
            return handler(request, &mut writer);
        };

        let request = request.map_body(|body| exchange.wrap_reader(body));
        let mut capturing = CaptureWriter::new(&mut writer, exchange.response_capture());
        let output = handler(request, &mut capturing);
        let (_, capture) = capturing.into_parts();

        self.complete(exchange, writer.headers(), capture);
        output
    }

    /// Stop background delivery, if any
    pub fn shutdown(&self) {
        self.logger.close();
    }

    fn needs_body(&self, current: &str, accept_any: bool) -> bool {
        if self.body_content_types.is_empty() {
            return true;
        }
        if accept_any && (current.is_empty() || current == "*/*") {
            return true;
        }
        let current = current.to_lowercase();
        self.body_content_types
            .iter()
            .any(|allowed| current.contains(&allowed.to_lowercase()))
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Assembles an [`Observer`] from configuration with optional overrides
pub struct ObserverBuilder {
    config: ObserverConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    writer: Option<Arc<dyn LogWriter>>,
    sink: Option<Arc<dyn SinkClient>>,
    logger: Option<Arc<dyn HttpLogger>>,
}

impl ObserverBuilder {
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            clock: None,
            ids: None,
            writer: None,
            sink: None,
            logger: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn writer(mut self, writer: Arc<dyn LogWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Ingestion sink used by the `langfuse` format instead of the HTTP client
    pub fn sink(mut self, sink: Arc<dyn SinkClient>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the format-selected logger entirely
    pub fn logger(mut self, logger: Arc<dyn HttpLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the observer.
    ///
    /// With the `langfuse` format this starts the delivery pipeline, so it
    /// must run inside a tokio runtime.
    pub fn build(self) -> Result<Observer> {
        let config = self.config;
        config.validate()?;

        if config.debug {
            info!("Observer config: {:?}", config);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let log_ids = self.ids.clone().unwrap_or_else(|| -> Arc<dyn IdGenerator> {
            if config.generate_log_id {
                Arc::new(RandomIdGenerator)
            } else {
                Arc::new(EmptyIdGenerator)
            }
        });
        let writer = self.writer.unwrap_or_else(|| Arc::new(StdoutWriter));

        let logger: Arc<dyn HttpLogger> = match self.logger {
            Some(logger) => logger,
            None if !config.enabled => Arc::new(TextLogger::new(writer)),
            None => match config.log_format {
                LogFormat::Text => Arc::new(TextLogger::new(writer)),
                LogFormat::Json => Arc::new(JsonLogger::new(clock.clone(), log_ids, writer)),
                LogFormat::Langfuse => {
                    let sink: Arc<dyn SinkClient> = match self.sink {
                        Some(sink) => sink,
                        None => {
                            let langfuse = config.langfuse.as_ref().ok_or_else(|| {
                                ObserverError::Config(
                                    "logFormat langfuse requires a langfuse block".to_string(),
                                )
                            })?;
                            Arc::new(LangfuseClient::new(langfuse)?)
                        }
                    };
                    // trace and span ids are always required
                    let event_ids = self.ids.unwrap_or_else(|| Arc::new(RandomIdGenerator));
                    let pipeline = DeliveryPipeline::new(
                        sink,
                        EventBuilder::new(event_ids),
                        DeliverySettings::from(&config.delivery),
                    );
                    pipeline.start();
                    pipeline
                }
            },
        };

        Ok(Observer {
            enabled: config.enabled,
            name: config.name,
            accept_any: config.accept_any,
            silent_headers: config.silent_headers,
            body_content_types: config.body_content_types,
            header_policy: HeaderPolicy::new(config.header_redacts, config.jwt_headers),
            request_body_redact: BodyRedactRules::parse(&config.request_body_redact),
            response_body_redact: BodyRedactRules::parse(&config.response_body_redact),
            logger,
            clock,
        })
    }
}

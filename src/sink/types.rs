//! Ingestion API payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Health endpoint answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub version: String,
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Kind of an ingestion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    TraceCreate,
    SpanCreate,
    SpanUpdate,
    EventCreate,
    ObservationCreate,
    ObservationUpdate,
    SdkLog,
}

/// One unit of an ingestion batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionEvent {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl IngestionEvent {
    fn new(id: String, timestamp: String, event_type: EventType, body: Value) -> Self {
        Self {
            id,
            timestamp,
            event_type,
            body,
            metadata: None,
        }
    }

    pub fn trace_create(id: String, timestamp: String, body: &TraceBody) -> Self {
        Self::new(id, timestamp, EventType::TraceCreate, to_body(body))
    }

    pub fn span_create(id: String, timestamp: String, body: &ObservationBody) -> Self {
        Self::new(id, timestamp, EventType::SpanCreate, to_body(body))
    }

    pub fn span_update(id: String, timestamp: String, body: &ObservationBody) -> Self {
        Self::new(id, timestamp, EventType::SpanUpdate, to_body(body))
    }

    pub fn event_create(id: String, timestamp: String, body: &ObservationBody) -> Self {
        Self::new(id, timestamp, EventType::EventCreate, to_body(body))
    }

    pub fn observation_create(id: String, timestamp: String, body: &ObservationBody) -> Self {
        Self::new(id, timestamp, EventType::ObservationCreate, to_body(body))
    }

    pub fn observation_update(id: String, timestamp: String, body: &ObservationBody) -> Self {
        Self::new(id, timestamp, EventType::ObservationUpdate, to_body(body))
    }

    pub fn sdk_log(id: String, timestamp: String, body: &SdkLogBody) -> Self {
        Self::new(id, timestamp, EventType::SdkLog, to_body(body))
    }
}

fn to_body<T: Serialize>(body: &T) -> Value {
    serde_json::to_value(body).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize event body, sending null");
        Value::Null
    })
}

/// Batch submitted to the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionRequest {
    pub batch: Vec<IngestionEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSuccess {
    pub id: String,
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionFailure {
    pub id: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Per-event outcome of an ingestion call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionResponse {
    #[serde(default)]
    pub successes: Vec<IngestionSuccess>,
    #[serde(default)]
    pub errors: Vec<IngestionFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationType {
    #[default]
    Span,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationLevel {
    Debug,
    #[default]
    Default,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(rename = "type")]
    pub observation_type: ObservationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_parameters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ObservationLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_observation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkLogBody {
    pub log: Value,
}

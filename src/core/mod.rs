//! Core functionality for the observer
//!
//! This module contains the capture engine: deciding what to record for an
//! exchange, wrapping request and response bodies, redacting sensitive data
//! and assembling the finished [`CaptureRecord`].

pub mod capture;
pub mod decoder;
pub mod observer;
pub mod record;
pub mod redaction;

pub use capture::{
    BufferedResponse, CaptureReader, CaptureWriter, HijackedIo, ResponseCapture, ResponseWriter,
};
pub use decoder::BodyDecoder;
pub use observer::{Exchange, ExchangeRequest, Observer, ObserverBuilder};
pub use record::{CaptureRecord, CapturedHeaders};
pub use redaction::{BodyRedactRules, HeaderPolicy, REDACTED};

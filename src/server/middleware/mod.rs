//! HTTP middleware implementations
//!
//! - `observer`: exchange capture around any actix-web service

mod observer;


pub use observer::{CaptureBody, ObserverMiddleware, ObserverMiddlewareService};

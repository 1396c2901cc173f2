//! HTTP server implementation
//!
//! This module provides the demo HTTP server with the observer middleware
//! wrapped around every route.

pub mod builder;
pub mod middleware;
pub mod routes;
pub mod server;

pub use builder::run_server;
pub use server::HttpServer;

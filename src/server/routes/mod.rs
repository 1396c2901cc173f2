//! HTTP route modules
//!
//! Small demo surface used to exercise the observer end to end.

pub mod demo;
pub mod health;

use actix_web::web;

/// Register every route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    health::configure_routes(cfg);
    demo::configure_routes(cfg);
}

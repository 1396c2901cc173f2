//! Health check endpoint

use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: Cow<'static, str>,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: Cow<'static, str>,
}

/// Basic health check endpoint
pub async fn health_check() -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    Ok(HttpResponse::Ok().json(HealthStatus {
        status: Cow::Borrowed("healthy"),
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
    }))
}

//! Demo handlers

use actix_web::{HttpResponse, web};

/// Configure demo routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/double", web::post().to(double));
}

/// Parse the body as an integer and answer with its double
pub async fn double(body: String) -> HttpResponse {
    match body.trim().parse::<i64>() {
        Ok(number) => HttpResponse::Ok()
            .content_type("text/plain")
            .body(number.saturating_mul(2).to_string()),
        Err(e) => HttpResponse::BadRequest()
            .content_type("text/plain")
            .body(format!("not a number: {}", e)),
    }
}

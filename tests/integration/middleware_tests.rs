//! Middleware integration tests
//!
//! Full actix services wrapped by the observer, checked through the
//! rendered output.

#[cfg(test)]
mod tests {
    use crate::common::{ConfigFactory, TEST_LOG_ID, json_records, test_observer};
    use actix_web::http::header;
    use actix_web::{App, HttpResponse, test, web};
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use httpscope::ObserverConfig;
    use httpscope::server::HttpServer;
    use httpscope::server::middleware::ObserverMiddleware;
    use httpscope::server::routes;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[actix_web::test]
    async fn test_text_format_block() {
        let (observer, writer) = test_observer(ConfigFactory::text());
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/double")
            .peer_addr("10.1.2.3:4567".parse().unwrap())
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("21")
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "42");

        let entries = writer.entries();
        assert_eq!(entries.len(), 1);
        let text = &entries[0];
        assert!(text.starts_with("10.1.2.3:4567 POST /double: 200 OK HTTP/1.1\n"));
        assert!(text.contains("\nRequest Headers:\n"));
        assert!(text.contains("\nContent-Type: text/plain\n"));
        assert!(text.contains("\nRequest Body:\n21\n"));
        assert!(text.contains("\nResponse Content Length: 2\n"));
        assert!(text.contains("\nDuration: 0.000 ms\n"));
        assert!(text.ends_with("\nResponse Body:\n42\n\n"));
    }

    #[actix_web::test]
    async fn test_deflate_request_is_logged_decoded() {
        let (observer, writer) = test_observer(ConfigFactory::json());
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/double")
            .insert_header((header::CONTENT_ENCODING, "deflate"))
            .set_payload(zlib(b"8"))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "16");

        let record = &json_records(&writer)[0];
        assert_eq!(record["requestBody"], "8");
        assert_eq!(record["responseBody"], "16");
        assert_eq!(record["requestHeaders"]["Content-Encoding"][0], "deflate");
    }

    #[actix_web::test]
    async fn test_content_type_allow_list_gates_bodies() {
        let (observer, writer) = test_observer(ObserverConfig {
            body_content_types: vec!["json".to_string()],
            ..ConfigFactory::json()
        });
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer))
                .configure(routes::configure_routes),
        )
        .await;

        // text body, text accept: neither side captured
        let req = test::TestRequest::post()
            .uri("/double")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .insert_header((header::ACCEPT, "text/plain"))
            .set_payload("2")
            .to_request();
        test::call_and_read_body(&app, req).await;

        // json accept: response captured
        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ACCEPT, "application/json"))
            .to_request();
        test::call_and_read_body(&app, req).await;

        let records = json_records(&writer);
        assert_eq!(records.len(), 2);
        assert!(records[0].get("requestBody").is_none());
        assert!(records[0].get("responseBody").is_none());
        assert_eq!(records[0]["responseContentLength"], 1);

        let health: serde_json::Value =
            serde_json::from_str(records[1]["responseBody"].as_str().unwrap()).unwrap();
        assert_eq!(health["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_accept_any_without_accept_header() {
        let (observer, writer) = test_observer(ObserverConfig {
            body_content_types: vec!["json".to_string()],
            accept_any: true,
            ..ConfigFactory::json()
        });
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        test::call_and_read_body(&app, req).await;

        let record = &json_records(&writer)[0];
        assert!(record["responseBody"].as_str().unwrap().contains("healthy"));
    }

    #[actix_web::test]
    async fn test_query_string_is_part_of_url() {
        let (observer, writer) = test_observer(ObserverConfig {
            response_body_redact: "GET /health?secret".to_string(),
            ..ConfigFactory::json()
        });
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health?secret=1")
            .to_request();
        test::call_and_read_body(&app, req).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        test::call_and_read_body(&app, req).await;

        let records = json_records(&writer);
        assert_eq!(records[0]["path"], "/health?secret=1");
        assert!(records[0].get("responseBody").is_none());
        assert!(records[1].get("responseBody").is_some());
    }

    #[actix_web::test]
    async fn test_error_status_is_recorded() {
        let (observer, writer) = test_observer(ConfigFactory::json());
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer))
                .configure(routes::configure_routes)
                .default_service(web::to(|| async { HttpResponse::NotFound().finish() })),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/double")
            .set_payload("not a number")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
        test::read_body(resp).await;

        let req = test::TestRequest::get().uri("/missing").to_request();
        test::call_and_read_body(&app, req).await;

        let records = json_records(&writer);
        assert_eq!(records[0]["status"], 400);
        assert_eq!(records[0]["statusText"], "Bad Request");
        assert_eq!(records[0]["requestBody"], "not a number");
        assert_eq!(records[1]["status"], 404);
        assert_eq!(records[1]["message"], "GET /missing HTTP/1.1 404");
        assert_eq!(records[1]["logId"], TEST_LOG_ID);
    }

    #[actix_web::test]
    async fn test_grpc_web_accept_passes_through() {
        let (observer, writer) = test_observer(ConfigFactory::json());
        let app = test::init_service(HttpServer::create_app(observer)).await;

        let req = test::TestRequest::post()
            .uri("/double")
            .insert_header((header::ACCEPT, "application/grpc-web-text"))
            .set_payload("3")
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "6");
        assert!(writer.is_empty());
    }

    #[actix_web::test]
    async fn test_generate_log_id_disabled() {
        let writer = std::sync::Arc::new(httpscope::logger::MemoryWriter::new());
        let observer = httpscope::Observer::builder(ObserverConfig {
            generate_log_id: false,
            ..ConfigFactory::json()
        })
        .writer(writer.clone())
        .build()
        .unwrap();
        let app = test::init_service(HttpServer::create_app(std::sync::Arc::new(observer))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        test::call_and_read_body(&app, req).await;

        let record = &json_records(&writer)[0];
        assert!(record.get("logId").is_none());
        assert_eq!(record["systemName"], "HTTP");
    }
}

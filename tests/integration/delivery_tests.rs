//! Delivery integration tests
//!
//! The `langfuse` format end to end against a mocked ingestion API, plus
//! pipeline behavior under overflow, failures and shutdown.

#[cfg(test)]
mod tests {
    use crate::common::{ConfigFactory, RecordFactory, RecordingSink};
    use actix_web::{App, test};
    use httpscope::Observer;
    use httpscope::config::LangfuseConfig;
    use httpscope::delivery::{DeliveryPipeline, DeliverySettings, EventBuilder};
    use httpscope::server::middleware::ObserverMiddleware;
    use httpscope::server::routes;
    use httpscope::sink::{EventType, LangfuseClient, SinkClient};
    use httpscope::utils::RandomIdGenerator;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> DeliverySettings {
        DeliverySettings {
            queue_capacity: 4,
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
            health_cooldown: Duration::from_millis(50),
            probe_interval: Duration::from_millis(20),
            health_check_timeout: Duration::from_millis(500),
        }
    }

    fn pipeline(sink: Arc<dyn SinkClient>, settings: DeliverySettings) -> Arc<DeliveryPipeline> {
        DeliveryPipeline::new(sink, EventBuilder::new(Arc::new(RandomIdGenerator)), settings)
    }

    /// Poll until `condition` holds or two seconds pass
    async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    async fn ingestion_bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == "/api/public/ingestion")
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }

    #[actix_web::test]
    async fn test_langfuse_format_ships_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/public/ingestion"))
            .and(basic_auth("pk-lf-test", "sk-lf-test"))
            .respond_with(ResponseTemplate::new(207).set_body_json(json!({
                "successes": [{"id": "a", "status": 201}],
                "errors": []
            })))
            .mount(&server)
            .await;

        let observer = Arc::new(
            Observer::builder(ConfigFactory::langfuse(&server.uri()))
                .build()
                .unwrap(),
        );
        let app = test::init_service(
            App::new()
                .wrap(ObserverMiddleware::new(observer.clone()))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/double")
            .set_payload("5")
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "10");

        let mut bodies = Vec::new();
        for _ in 0..200 {
            bodies = ingestion_bodies(&server).await;
            if !bodies.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        observer.shutdown();

        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["metadata"], json!({"source": "httpscope", "system": "HTTP"}));

        let batch = body["batch"].as_array().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0]["type"], "trace-create");
        assert_eq!(batch[0]["body"]["name"], "HTTP: POST /double");
        assert_eq!(batch[0]["body"]["input"]["body"], "5");
        assert_eq!(batch[0]["body"]["output"]["responseBody"], "10");
        assert_eq!(batch[1]["type"], "span-create");
        assert_eq!(batch[1]["body"]["traceId"], batch[0]["body"]["id"]);
        assert_ne!(batch[0]["body"]["id"], batch[1]["body"]["id"]);
    }

    #[tokio::test]
    async fn test_failed_delivery_retries_then_prober_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/public/ingestion"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/public/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"version": "3", "status": "OK"})),
            )
            .mount(&server)
            .await;

        let client = LangfuseClient::new(&LangfuseConfig {
            base_url: server.uri(),
            public_key: "pk".to_string(),
            secret_key: "sk".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        let pipeline = pipeline(Arc::new(client), settings());

        // direct delivery exhausts both attempts
        assert!(!pipeline.deliver(&RecordFactory::double("1", "2")).await);
        assert_eq!(ingestion_bodies(&server).await.len(), 2);
        let state = pipeline.health();
        assert!(!state.healthy);
        assert!(state.probing);

        pipeline.start();
        let probe = pipeline.clone();
        assert!(eventually(move || probe.health().healthy).await);
        assert!(!pipeline.health().probing);

        pipeline.stop();
        pipeline.join().await;
    }

    #[tokio::test]
    async fn test_overflow_drops_oldest_records() {
        let sink = Arc::new(RecordingSink::new());
        let pipeline = pipeline(sink.clone(), settings());

        for n in 0..6 {
            pipeline.submit(RecordFactory::double(&n.to_string(), ""));
        }
        assert_eq!(pipeline.queued(), 4);

        pipeline.start();
        let watched = sink.clone();
        assert!(eventually(move || watched.batches().len() == 4).await);

        let delivered: Vec<Value> = sink
            .batches()
            .iter()
            .map(|batch| batch.batch[0].body["input"]["body"].clone())
            .collect();
        assert_eq!(delivered, vec!["2", "3", "4", "5"]);
        assert!(
            sink.batches()
                .iter()
                .all(|batch| batch.batch[0].event_type == EventType::TraceCreate)
        );

        pipeline.stop();
        pipeline.join().await;
    }

    #[tokio::test]
    async fn test_health_check_cooldown_skips_sink() {
        let sink = Arc::new(RecordingSink::new());
        sink.set_failing(true);
        let pipeline = pipeline(
            sink.clone(),
            DeliverySettings {
                health_cooldown: Duration::from_secs(60),
                ..settings()
            },
        );

        assert!(pipeline.check_health().await);
        assert_eq!(sink.health_calls(), 0);

        assert!(!pipeline.deliver(&RecordFactory::double("1", "2")).await);
        assert_eq!(sink.ingest_calls(), 2);

        // inside the cooldown window the sink is not contacted
        assert!(!pipeline.check_health().await);
        assert_eq!(sink.health_calls(), 0);
    }

    #[tokio::test]
    async fn test_close_discards_queue_and_stops_workers() {
        let sink = Arc::new(RecordingSink::new());
        sink.set_failing(true);
        let pipeline = pipeline(
            sink.clone(),
            DeliverySettings {
                max_attempts: 5,
                initial_backoff: Duration::from_secs(30),
                ..settings()
            },
        );

        pipeline.start();
        for n in 0..3 {
            pipeline.submit(RecordFactory::double(&n.to_string(), ""));
        }
        let watched = sink.clone();
        assert!(eventually(move || watched.ingest_calls() >= 1).await);

        // the consumer sits in a long backoff; close must interrupt it
        tokio::time::timeout(Duration::from_secs(2), async {
            pipeline.close();
            pipeline.join().await;
        })
        .await
        .expect("pipeline should stop promptly");

        assert_eq!(pipeline.queued(), 0);
        assert_eq!(sink.ingest_calls(), 1);
    }
}

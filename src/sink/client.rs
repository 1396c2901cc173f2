//! Langfuse public API client

use super::SinkClient;
use super::types::{HealthResponse, IngestionRequest, IngestionResponse};
use crate::config::LangfuseConfig;
use crate::utils::error::{ObserverError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const HEALTH_PATH: &str = "/api/public/health";
const INGESTION_PATH: &str = "/api/public/ingestion";

/// HTTP client for a Langfuse-compatible ingestion API
#[derive(Debug, Clone)]
pub struct LangfuseClient {
    client: Client,
    base_url: String,
    public_key: String,
    secret_key: String,
}

impl LangfuseClient {
    pub fn new(config: &LangfuseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            public_key: config.public_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

#[async_trait]
impl SinkClient for LangfuseClient {
    async fn health(&self) -> Result<HealthResponse> {
        let response = self.request(reqwest::Method::GET, HEALTH_PATH).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ObserverError::HealthCheck {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<HealthResponse>().await?)
    }

    async fn ingest(&self, request: &IngestionRequest) -> Result<IngestionResponse> {
        let response = self
            .request(reqwest::Method::POST, INGESTION_PATH)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::MULTI_STATUS => {
                debug!(status = status.as_u16(), "Ingestion batch accepted");
                Ok(serde_json::from_str(&body)?)
            }
            _ => Err(ObserverError::Ingestion {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

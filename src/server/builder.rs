//! Server builder and run_server function
//!
//! This module provides the ServerBuilder for assembling the demo server and
//! the run_server function for automatic configuration loading.

use crate::config::ObserverConfig;
use crate::core::observer::Observer;
use crate::server::server::HttpServer;
use crate::utils::error::{ObserverError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<ObserverConfig>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: ObserverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the observer and the HTTP server around it.
    ///
    /// Must run inside a tokio runtime when the `langfuse` format is used.
    pub fn build(self) -> Result<(HttpServer, Arc<Observer>)> {
        let config = self
            .config
            .ok_or_else(|| ObserverError::Config("Configuration is required".to_string()))?;

        let server_config = config.server.clone();
        let observer = Arc::new(Observer::builder(config).build()?);
        Ok((HttpServer::new(server_config, observer.clone()), observer))
    }
}

/// Load configuration from `config_path`, falling back to defaults plus
/// environment overrides when the file cannot be read
pub async fn load_config(config_path: &Path) -> Result<ObserverConfig> {
    info!("Loading configuration file: {}", config_path.display());

    match ObserverConfig::from_file(config_path).await {
        Ok(config) => Ok(config),
        Err(ObserverError::Config(message)) if !config_path.exists() => {
            warn!(
                "Configuration file loading failed, using default config: {}",
                message
            );
            ObserverConfig::from_env()
        }
        Err(e) => Err(e),
    }
}

/// Run the demo server until it stops, then drain the observer
pub async fn run_server(config_path: &Path) -> Result<()> {
    info!("Starting httpscope");

    let config = load_config(config_path).await?;
    info!(
        "Observer {} enabled={} format={}",
        config.name, config.enabled, config.log_format
    );

    let (server, observer) = ServerBuilder::new().with_config(config).build()?;
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /double - Double an integer body");

    let result = server.start().await;
    observer.shutdown();
    result
}

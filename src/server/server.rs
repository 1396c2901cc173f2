//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::config::ServerConfig;
use crate::core::observer::Observer;
use crate::server::middleware::ObserverMiddleware;
use crate::server::routes;
use crate::utils::error::{ObserverError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders};
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP server
pub struct HttpServer {
    config: ServerConfig,
    observer: Arc<Observer>,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: ServerConfig, observer: Arc<Observer>) -> Self {
        Self { config, observer }
    }

    /// Create the Actix-web application
    pub fn create_app(
        observer: Arc<Observer>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(ObserverMiddleware::new(observer))
            .wrap(DefaultHeaders::new().add(("Server", "httpscope")))
            .configure(routes::configure_routes)
    }

    /// Start the HTTP server and run until it stops
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let port = self.config.port;

        info!("Starting HTTP server on {}", bind_addr);

        let observer = self.observer;
        let mut server = ActixHttpServer::new(move || Self::create_app(observer.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr, port))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| ObserverError::Server(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Friendlier message for the common port binding failures
    pub(crate) fn format_bind_error(
        error: std::io::Error,
        bind_addr: &str,
        port: u16,
    ) -> ObserverError {
        match error.kind() {
            std::io::ErrorKind::AddrInUse => {
                warn!("Port {} is already in use", port);
                ObserverError::Server(format!(
                    "Port {} is already in use; set server.port to another value (e.g. {})",
                    port,
                    port.saturating_add(1)
                ))
            }
            std::io::ErrorKind::PermissionDenied => ObserverError::Server(format!(
                "Permission denied for port {}; use a port >= 1024",
                port
            )),
            _ => ObserverError::Server(format!("Failed to bind to {}: {}", bind_addr, error)),
        }
    }
}

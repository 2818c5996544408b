//! # HTTP Server
//!
//! Combines the item and health routers into one axum server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::health_routes::health_routes;
use super::item_routes::{item_routes, ItemsState};
use super::middleware::log_requests;
use crate::observability::Logger;
use crate::session::ItemStore;

/// HTTP server for the item API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with default configuration over `store`
    pub fn new(store: Arc<ItemStore>) -> Self {
        Self::with_config(HttpServerConfig::default(), store)
    }

    /// Create a server with custom configuration over `store`
    pub fn with_config(config: HttpServerConfig, store: Arc<ItemStore>) -> Self {
        let router = build_router(&config, store);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C is received.
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info("SERVER_STARTING", &[("addr", &addr.to_string())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Logger::info("SERVER_STOPPED", &[]);
        Ok(())
    }
}

/// Build the combined router with all endpoints
pub fn build_router(config: &HttpServerConfig, store: Arc<ItemStore>) -> Router {
    let state = Arc::new(ItemsState::new(store));

    Router::new()
        .merge(health_routes(state.clone()))
        .merge(item_routes(state))
        .layer(cors_layer(config))
        .layer(middleware::from_fn(log_requests))
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins = match config.allowed_origins() {
        Ok(origins) => origins,
        Err(e) => {
            Logger::warn("CORS_ORIGIN_REJECTED", &[("error", &e)]);
            Vec::new()
        }
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        Logger::warn("SHUTDOWN_SIGNAL_FAILED", &[("error", &e.to_string())]);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, Arc<ItemStore>) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(ItemStore::open(temp.path()).unwrap());
        (temp, store)
    }

    #[test]
    fn test_server_creation() {
        let (_temp, store) = store();
        let server = HttpServer::new(store);
        assert_eq!(server.socket_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_server_with_custom_port() {
        let (_temp, store) = store();
        let server = HttpServer::with_config(HttpServerConfig::with_port(8080), store);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_explicit_origins() {
        let (_temp, store) = store();
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::with_config(config, store).router();
    }
}

//! Main Gateway implementation
//!
//! Owns the router and the server loop. The store is chosen before the
//! gateway is built and injected through [`GatewayState`].

use axum::{middleware, routing::get, Router};
use presence_core::{select_store, seed_sample_data, PresenceStore};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::cors::apply_cors_headers;
use crate::routes;
use crate::{GatewayError, Result};

/// Gateway state shared across handlers
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub store: Arc<dyn PresenceStore>,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, store: Arc<dyn PresenceStore>) -> Self {
        Self { config, store }
    }

    /// Run one store call off the async executor
    pub async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn PresenceStore) -> presence_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || f(store.as_ref())).await?;
        Ok(result?)
    }
}

/// Main Gateway
#[derive(Debug)]
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a gateway around an already selected store
    pub fn new(config: GatewayConfig, store: Arc<dyn PresenceStore>) -> Self {
        let state = Arc::new(GatewayState::new(config, store));
        Self { state }
    }

    /// Select and migrate the store named by `config`, seed it if asked,
    /// and build the gateway around it.
    pub async fn from_config(config: GatewayConfig) -> Result<Self> {
        let settings = config.store.clone();
        let seed = config.seed_sample_data;

        let store = tokio::task::spawn_blocking(move || {
            let store = select_store(&settings)?;
            if seed {
                seed_sample_data(store.as_ref())?;
            }
            Ok::<_, GatewayError>(store)
        })
        .await??;

        Ok(Self::new(config, store))
    }

    /// Get gateway state
    pub fn state(&self) -> Arc<GatewayState> {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        Router::new()
            .route(
                "/users",
                get(routes::list_or_get)
                    .post(routes::create)
                    .patch(routes::update)
                    .delete(routes::destroy)
                    .options(routes::preflight),
            )
            .route("/health", get(routes::health))
            .layer(middleware::map_response_with_state(
                self.state.clone(),
                apply_cors_headers,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the gateway server and run until Ctrl+C or SIGTERM
    pub async fn start(&self) -> Result<()> {
        let addr = self.state.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!(
            "Presence gateway starting on {} ({} store)",
            addr,
            self.state.store.backend()
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Presence gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_core::{MemoryStore, StoreBackend};

    #[test]
    fn test_gateway_creation() {
        let gateway = Gateway::new(GatewayConfig::default(), Arc::new(MemoryStore::new()));
        assert!(gateway.state().config.port > 0);
        assert_eq!(gateway.state().store.backend(), StoreBackend::Memory);
    }

    #[tokio::test]
    async fn test_from_config_seeds_memory_store() {
        let config = GatewayConfig::default()
            .with_store_backend(StoreBackend::Memory)
            .with_seed_sample_data(true);

        let gateway = Gateway::from_config(config).await.unwrap();
        let count = gateway
            .state()
            .with_store(|store| store.count())
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_from_config_reports_unusable_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = GatewayConfig::default().with_database_path(dir.path());

        let err = Gateway::from_config(config).await.unwrap_err();
        assert!(matches!(err, GatewayError::Store(_)));
    }
}

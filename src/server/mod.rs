//! HTTP inference server
//!
//! Loads the model bundle once at startup and serves health, schema,
//! prediction and care advice routes from it.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::explainability::ExplainConfig;
use crate::inference::InferenceEngine;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub explain: ExplainConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model.bin")),
            explain: ExplainConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_explain(mut self, explain: ExplainConfig) -> Self {
        self.explain = explain;
        self
    }
}

/// Start the server with the given configuration.
///
/// Fails before binding if the bundle cannot be loaded.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model_path = %config.model_path.display(),
        started_at = %start_time.to_rfc3339(),
        "Loading model bundle"
    );

    let engine = InferenceEngine::load(&config.model_path, config.explain.clone())?;
    info!(
        features = engine.bundle().schema.n_features(),
        classes = engine.bundle().pipeline.classes().len(),
        "Model bundle loaded"
    );

    let state = Arc::new(AppState::new(engine)?);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = ServerConfig::default()
            .with_host("127.0.0.1")
            .with_port(9000)
            .with_model_path("artifacts/model.bin");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, PathBuf::from("artifacts/model.bin"));
    }

    #[tokio::test]
    async fn test_missing_bundle_aborts_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::default()
            .with_host("127.0.0.1")
            .with_port(0)
            .with_model_path(dir.path().join("missing.bin"));
        assert!(run_server(config).await.is_err());
    }
}

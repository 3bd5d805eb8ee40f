//! Health Check Server - Liveness, Readiness and Metrics
//!
//! Exposes /live, /ready and /metrics via axum 0.7. Readiness tracks
//! whether the price store still answers queries.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::prometheus::MetricsRegistry;
use crate::ports::repository::PriceRepository;

/// State shared with every handler.
struct HealthState<R> {
    repository: Arc<R>,
    metrics: Arc<MetricsRegistry>,
}

impl<R> Clone for HealthState<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Axum-based health and metrics HTTP server.
pub struct HealthServer<R: PriceRepository> {
    state: HealthState<R>,
    /// Bind address, e.g. `0.0.0.0:9090`.
    bind_address: String,
}

impl<R: PriceRepository> HealthServer<R> {
    /// Create a new health server.
    pub fn new(
        repository: Arc<R>,
        metrics: Arc<MetricsRegistry>,
        bind_address: impl Into<String>,
    ) -> Self {
        Self {
            state: HealthState {
                repository,
                metrics,
            },
            bind_address: bind_address.into(),
        }
    }

    /// Build the router without binding; used by `run` and by tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/metrics", get(Self::metrics))
            .with_state(self.state.clone())
    }

    /// Serve until the shutdown signal fires.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        info!(address = %self.bind_address, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always 200 while the process runs.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: 200 only while the store is reachable.
    async fn readiness(State(state): State<HealthState<R>>) -> impl IntoResponse {
        if state.repository.is_healthy().await {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }

    async fn metrics(State(state): State<HealthState<R>>) -> impl IntoResponse {
        match state.metrics.render() {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => {
                error!(error = %e, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        }
    }
}

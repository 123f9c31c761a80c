//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID, metrics)
//! - Bind server to listener
//! - Stop accepting on shutdown, then drain in-flight runs
//!
//! No request timeout layer wraps the asset routes: a dropped handler
//! future must not be the way a run ends. Runs are bounded by their own
//! deadline instead.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::assets::{AssetLifecycle, SigningIdentity};
use crate::blockchain::KeyDaemon;
use crate::config::ListenerConfig;
use crate::http::handlers;
use crate::http::middleware::track_metrics;
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<AssetLifecycle>,
    pub daemon: Arc<dyn KeyDaemon>,
    pub identity: Arc<SigningIdentity>,
    pub shutdown: Shutdown,
    /// Deadline given to each run's confirmation wait.
    pub confirmation_timeout: Duration,
    /// Create and destroy runs that must finish before the process exits.
    pub runs: TaskTracker,
}

/// HTTP server for the asset manager.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
    runs: TaskTracker,
    drain_timeout: Duration,
}

impl HttpServer {
    pub fn new(state: AppState, config: &ListenerConfig) -> Self {
        let shutdown = state.shutdown.clone();
        let runs = state.runs.clone();
        let router = Self::build_router(config, state);
        Self {
            router,
            shutdown,
            runs,
            drain_timeout: Duration::from_secs(config.drain_timeout_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/assets", post(handlers::create_asset))
            .route("/assets/destroy", post(handlers::destroy_asset))
            .route("/assets/{address}", get(handlers::list_assets))
            .route("/health", get(handlers::health))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.max_body_bytes)),
            )
    }

    /// Run the server until shutdown is triggered, then wait up to the drain
    /// timeout for runs whose client already went away.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let signal = Shutdown::wait(self.shutdown.subscribe());
        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        self.runs.close();
        if !self.runs.is_empty() {
            tracing::info!(in_flight = self.runs.len(), "Draining in-flight runs");
        }
        if tokio::time::timeout(self.drain_timeout, self.runs.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                in_flight = self.runs.len(),
                drain_timeout_secs = self.drain_timeout.as_secs(),
                "Runs still in flight after drain timeout, leased keys may remain in the wallet"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Binds the configured operator address and serves the health routes
//! until shutdown is requested.

use std::time::Instant;

use axum::Router;
use axum::routing::get;
use mynah_config::model::GatewayConfig;
use mynah_core::{MynahError, Readiness};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::health;

/// Shared state for the health routes.
#[derive(Clone)]
pub struct HealthState {
    /// Gateway start time, for uptime calculation.
    pub started: Instant,
    /// Mirrors admission pipeline readiness.
    pub readiness: watch::Receiver<Readiness>,
}

/// Builds the gateway router.
pub(crate) fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Operator HTTP server exposing the health surface.
pub struct GatewayServer {
    config: GatewayConfig,
    state: HealthState,
}

impl GatewayServer {
    /// Creates a gateway over the given readiness feed.
    pub fn new(config: GatewayConfig, readiness: watch::Receiver<Readiness>) -> Self {
        Self {
            config,
            state: HealthState {
                started: Instant::now(),
                readiness,
            },
        }
    }

    /// Binds the configured address and serves until the token cancels.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), MynahError> {
        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            MynahError::Internal(format!("failed to bind gateway on {addr}: {e}"))
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            MynahError::Internal(format!("failed to read gateway address: {e}"))
        })?;

        info!(addr = %local_addr, "operator gateway listening");

        let app = router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await
            .map_err(|e| MynahError::Internal(format!("gateway server error: {e}")))?;

        info!("operator gateway stopped");
        Ok(())
    }
}

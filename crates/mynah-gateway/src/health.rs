// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health endpoint handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::server::HealthState;

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status. Always "ok" while the process serves requests.
    pub status: String,
    /// Admission pipeline readiness ("ready" or "not_ready").
    pub readiness: String,
    /// Version of the running binary.
    pub version: String,
    /// Seconds since the gateway came up.
    pub uptime_secs: u64,
}

/// GET /health
///
/// Unauthenticated so process supervisors and uptime probes can poll it
/// without credentials.
pub async fn get_health(State(state): State<HealthState>) -> Json<HealthResponse> {
    let readiness = *state.readiness.borrow();
    Json(HealthResponse {
        status: "ok".to_string(),
        readiness: readiness.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

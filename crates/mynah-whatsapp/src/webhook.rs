// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Axum webhook receiver for Cloud API notifications.
//!
//! Serves the subscription verify handshake (GET) and signed message
//! deliveries (POST) on `/webhook`, decoding each delivery into transport
//! events for the agent loop.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use http::{HeaderMap, StatusCode};
use mynah_core::TransportEvent;
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, trace, warn};

use crate::signature;
use crate::wire::NotificationPayload;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub(crate) struct WebhookState {
    pub verify_token: String,
    /// When `None`, signature checking is skipped (local development only).
    pub app_secret: Option<String>,
    pub events: mpsc::Sender<TransportEvent>,
}

/// Builds the webhook router.
pub(crate) fn router(state: WebhookState) -> Router {
    Router::new()
        .route(
            "/webhook",
            get(verify_subscription).post(receive_notification),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters of the subscription verify handshake.
#[derive(Debug, Deserialize)]
pub(crate) struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: String,
    #[serde(rename = "hub.verify_token")]
    verify_token: String,
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// GET handler: echoes the challenge when the verify token matches.
async fn verify_subscription(
    State(state): State<WebhookState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    if params.mode == "subscribe" && params.verify_token == state.verify_token {
        debug!("webhook subscription verified");
        (StatusCode::OK, params.challenge).into_response()
    } else {
        warn!(mode = %params.mode, "webhook subscription rejected");
        StatusCode::FORBIDDEN.into_response()
    }
}

/// POST handler: checks the delivery signature, decodes the payload, and
/// forwards the events.
///
/// Authenticated deliveries are always acknowledged with 200, including
/// undecodable ones; Meta redelivers on anything else.
async fn receive_notification(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = state.app_secret.as_deref() {
        let signed = headers
            .get(signature::SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|value| signature::verify_signature(secret, &body, value));
        if !signed {
            warn!("rejecting webhook delivery with a missing or invalid signature");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let payload: NotificationPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "acknowledging undecodable webhook delivery");
            return StatusCode::OK;
        }
    };

    if payload.object != "whatsapp_business_account" {
        trace!(object = %payload.object, "ignoring notification for another object");
        return StatusCode::OK;
    }

    for event in payload.into_events() {
        if state
            .events
            .send(TransportEvent::Inbound(event))
            .await
            .is_err()
        {
            warn!("inbound channel closed, dropping webhook delivery");
            return StatusCode::OK;
        }
    }
    StatusCode::OK
}

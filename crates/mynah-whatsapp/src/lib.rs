// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp transport adapter for the Mynah agent.
//!
//! Implements [`ChatTransport`] for the WhatsApp Business Cloud API.
//! Inbound traffic arrives on an axum webhook receiver (subscription
//! handshake plus HMAC-signed deliveries); outbound traffic goes through
//! the Graph API message and media endpoints.

pub mod client;
pub mod signature;
pub mod webhook;
pub mod wire;

use std::net::SocketAddr;
use std::path::Path;

use async_trait::async_trait;
use mynah_config::model::WhatsAppConfig;
use mynah_core::error::MynahError;
use mynah_core::traits::{Adapter, ChatTransport};
use mynah_core::types::{
    AdapterType, HealthStatus, MediaRef, MessageId, Readiness, SenderId, TransportCapabilities,
    TransportEvent,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::client::GraphClient;
use crate::webhook::WebhookState;

/// WhatsApp transport implementing [`ChatTransport`].
///
/// `connect` binds the webhook listener and reports the session ready;
/// the agent loop then pulls decoded deliveries through `receive`.
pub struct WhatsAppTransport {
    client: GraphClient,
    config: WhatsAppConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<TransportEvent>>,
    inbound_tx: mpsc::Sender<TransportEvent>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl WhatsAppTransport {
    /// Creates a new WhatsApp transport adapter.
    ///
    /// Requires `whatsapp.access_token`, `whatsapp.phone_number_id`, and
    /// `whatsapp.verify_token` to be set.
    pub fn new(config: WhatsAppConfig) -> Result<Self, MynahError> {
        let access_token = require(&config.access_token, "whatsapp.access_token")?;
        let phone_number_id = require(&config.phone_number_id, "whatsapp.phone_number_id")?;
        require(&config.verify_token, "whatsapp.verify_token")?;

        if config.app_secret.is_none() {
            warn!("whatsapp.app_secret is unset, webhook signatures will not be checked");
        }

        let client = GraphClient::new(&access_token, &phone_number_id, &config.api_version)?;
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            client,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            server_handle: None,
            local_addr: None,
        })
    }

    /// The address the webhook listener is bound to, once connected.
    pub fn webhook_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

/// Reads a required config field, rejecting absent and empty values.
fn require(field: &Option<String>, name: &str) -> Result<String, MynahError> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        Some(_) => Err(MynahError::Config(format!("{name} cannot be empty"))),
        None => Err(MynahError::Config(format!(
            "{name} is required for the WhatsApp adapter"
        ))),
    }
}

#[async_trait]
impl Adapter for WhatsAppTransport {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, MynahError> {
        // Reading the phone number object validates the token and the
        // number association in one call.
        match self.client.check_credentials().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Cloud API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), MynahError> {
        debug!("WhatsApp transport shutting down");
        if let Some(handle) = self.server_handle.as_ref() {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for WhatsAppTransport {
    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities {
            supports_images: true,
            supports_documents: true,
            // The Cloud API has no standalone presence endpoint.
            supports_typing: false,
            max_message_length: Some(4096),
        }
    }

    async fn connect(&mut self) -> Result<(), MynahError> {
        if self.server_handle.is_some() {
            return Ok(()); // Already connected
        }

        let addr = format!(
            "{}:{}",
            self.config.bind_address, self.config.webhook_port
        );
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            MynahError::Transport {
                message: format!("failed to bind webhook listener on {addr}: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        let local_addr = listener.local_addr().map_err(|e| MynahError::Transport {
            message: format!("failed to read webhook listener address: {e}"),
            source: Some(Box::new(e)),
        })?;
        self.local_addr = Some(local_addr);

        let state = WebhookState {
            verify_token: self.config.verify_token.clone().unwrap_or_default(),
            app_secret: self.config.app_secret.clone(),
            events: self.inbound_tx.clone(),
        };
        let app = webhook::router(state);
        let tx = self.inbound_tx.clone();

        info!(addr = %local_addr, "starting WhatsApp webhook receiver");

        let handle = tokio::spawn(async move {
            // The bound listener is what makes the session receivable, so
            // readiness is reported before serving begins; connections
            // queue in the accept backlog until then.
            if tx
                .send(TransportEvent::ReadinessChanged(Readiness::Ready))
                .await
                .is_err()
            {
                warn!("inbound channel closed before the webhook came up");
                return;
            }
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "webhook server exited");
            }
            let _ = tx
                .send(TransportEvent::ReadinessChanged(Readiness::NotReady))
                .await;
        });

        self.server_handle = Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<TransportEvent, MynahError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| MynahError::Transport {
            message: "WhatsApp inbound channel closed".into(),
            source: None,
        })
    }

    async fn send_text(&self, to: &SenderId, text: &str) -> Result<MessageId, MynahError> {
        self.client.send_text(to, text).await
    }

    async fn send_media(
        &self,
        to: &SenderId,
        media: &Path,
        caption: &str,
    ) -> Result<MessageId, MynahError> {
        self.client.send_image(to, media, caption).await
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, MynahError> {
        self.client.fetch_media(&media.id).await
    }
}

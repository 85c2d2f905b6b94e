// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for messaging platform integrations.

use std::path::Path;

use async_trait::async_trait;

use crate::error::MynahError;
use crate::traits::adapter::Adapter;
use crate::types::{MediaRef, MessageId, SenderId, TransportCapabilities, TransportEvent};

/// Adapter for a bidirectional messaging session.
///
/// A transport feeds the agent loop with [`TransportEvent`]s (inbound
/// messages and readiness changes) and exposes the narrow send surface the
/// pipeline needs. Session authentication and pairing stay inside the
/// adapter; the pipeline never sees them.
#[async_trait]
pub trait ChatTransport: Adapter {
    /// Returns the capabilities supported by this transport.
    fn capabilities(&self) -> TransportCapabilities;

    /// Establishes the session with the messaging platform.
    async fn connect(&mut self) -> Result<(), MynahError>;

    /// Receives the next event from the session.
    async fn receive(&self) -> Result<TransportEvent, MynahError>;

    /// Sends a plain text message to the given conversation.
    async fn send_text(&self, to: &SenderId, text: &str) -> Result<MessageId, MynahError>;

    /// Signals a typing indicator for the given conversation. Transports
    /// without presence support keep the default no-op.
    async fn send_typing(&self, _to: &SenderId) -> Result<(), MynahError> {
        Ok(())
    }

    /// Sends a local media file with a caption to the given conversation.
    async fn send_media(
        &self,
        to: &SenderId,
        media: &Path,
        caption: &str,
    ) -> Result<MessageId, MynahError>;

    /// Downloads the payload behind a media reference.
    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, MynahError>;
}

// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Mynah pipeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Suffix marking a group conversation identity.
const GROUP_SUFFIX: &str = "@g.us";

/// Opaque identity of one conversation partner.
///
/// Individuals and groups live in disjoint namespaces: group identities
/// carry the `@g.us` suffix, individual identities never do. The suffix is
/// assigned by the transport and is stable for the life of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderId(pub String);

impl SenderId {
    /// Whether this identity names a group conversation.
    pub fn is_group(&self) -> bool {
        self.0.ends_with(GROUP_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SenderId {
    fn from(s: &str) -> Self {
        SenderId(s.to_string())
    }
}

/// Unique identifier for a message, assigned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Whether the transport session can currently send and receive.
///
/// Owned by the admission pipeline; all writes go through its transition
/// method so the drain-once invariant is enforced structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// Session down or not yet paired. Inbound messages queue.
    NotReady,
    /// Session connected. Inbound messages are answered live.
    Ready,
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::NotReady => write!(f, "not_ready"),
            Readiness::Ready => write!(f, "ready"),
        }
    }
}

/// Reference to a media attachment carried by an inbound message.
///
/// The payload itself stays with the transport until fetched through
/// [`crate::ChatTransport::fetch_media`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Transport-scoped media identifier used for download.
    pub id: String,
    pub mime_type: String,
    pub filename: Option<String>,
}

impl MediaRef {
    /// Whether this attachment is a document the extractor understands.
    pub fn is_document(&self) -> bool {
        self.mime_type == "application/pdf"
            || self
                .filename
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
    }
}

/// One inbound message as delivered by a transport adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub id: MessageId,
    /// The conversation peer. For self-originated messages this is the
    /// recipient, which is what the auto-approve path needs.
    pub sender: SenderId,
    /// Display name of the contact, when the transport knows it.
    pub sender_name: Option<String>,
    /// Group subject, present only for group conversations.
    pub group_name: Option<String>,
    pub text: Option<String>,
    pub media: Option<MediaRef>,
    /// True when this message was sent by the bot's own account.
    pub is_self: bool,
    /// True for status/broadcast-origin traffic, which is never answered.
    pub is_broadcast: bool,
    pub timestamp: DateTime<Utc>,
}

impl InboundEvent {
    pub fn is_group(&self) -> bool {
        self.sender.is_group()
    }

    /// Message body, empty string when the message carries only media.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Events a transport adapter delivers to the agent loop.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Inbound(InboundEvent),
    /// Session readiness changed (connected, disconnected, auth failure).
    ReadinessChanged(Readiness),
}

/// A fully-formed reply produced by a response generator.
///
/// The outward-send step pattern-matches this exhaustively; generation
/// failures travel as `Err(MynahError::GenerationFailed)` rather than as a
/// reply variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// A generated image on local disk plus the caption to send with it.
    /// The file is deleted after a successful send.
    Image { path: PathBuf, caption: String },
}

/// Input to [`crate::ResponseGenerator::generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub text: String,
    /// Rendered conversation context, empty when there is no history.
    pub context: String,
    pub is_group: bool,
    pub group_name: Option<String>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Generator,
    Extractor,
}

/// Capabilities reported by a transport adapter.
#[derive(Debug, Clone)]
pub struct TransportCapabilities {
    pub supports_images: bool,
    pub supports_documents: bool,
    pub supports_typing: bool,
    pub max_message_length: Option<usize>,
}

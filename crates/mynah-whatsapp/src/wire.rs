// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud API wire types.
//!
//! Inbound webhook notification payloads and outbound Graph API request
//! bodies, plus the mapping from a delivered message to the transport's
//! [`InboundEvent`].

use chrono::{DateTime, Utc};
use mynah_core::{InboundEvent, MediaRef, MessageId, SenderId};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// One webhook delivery. Meta batches messages from several conversations
/// into a single notification.
#[derive(Debug, Deserialize)]
pub struct NotificationPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

/// Body of one change notification. Which vectors are populated depends
/// on the subscribed field: `messages` carries inbound traffic and
/// delivery statuses, `smb_message_echoes` carries the account's own
/// outbound messages.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub message_echoes: Vec<WireMessage>,
    #[serde(default)]
    pub statuses: Vec<DeliveryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<ContactProfile>,
}

#[derive(Debug, Deserialize)]
pub struct ContactProfile {
    #[serde(default)]
    pub name: Option<String>,
}

/// Delivery receipt for a previously sent message. Not conversation
/// traffic; decoded only so the payload parses cleanly.
#[derive(Debug, Deserialize)]
pub struct DeliveryStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

/// One message inside a notification.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub id: String,
    pub from: String,
    /// Present only on echoes of the account's own messages.
    #[serde(default)]
    pub to: Option<String>,
    /// Unix seconds, as a decimal string.
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub document: Option<MediaAttachment>,
    #[serde(default)]
    pub image: Option<MediaAttachment>,
    /// Group conversation identity, suffixed `@g.us`. Absent in
    /// one-to-one chats, where `from` is the conversation peer.
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaAttachment {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl NotificationPayload {
    /// Flattens the notification into inbound events, in delivery order.
    /// Statuses and undecodable messages are dropped with a log line.
    pub fn into_events(self) -> Vec<InboundEvent> {
        let mut events = Vec::new();
        for entry in self.entry {
            for change in entry.changes {
                let ChangeValue {
                    contacts,
                    messages,
                    message_echoes,
                    statuses,
                } = change.value;

                for status in &statuses {
                    trace!(
                        message_id = %status.id,
                        status = %status.status,
                        "ignoring delivery status"
                    );
                }

                for msg in messages {
                    events.extend(msg.into_inbound(&contacts, false));
                }
                for msg in message_echoes {
                    events.extend(msg.into_inbound(&contacts, true));
                }
            }
        }
        events
    }
}

impl WireMessage {
    /// Maps one wire message onto the transport event model.
    ///
    /// For echoes the conversation peer is the recipient, which is what
    /// the auto-approve path keys on. Group messages are keyed by the
    /// group identity rather than the authoring member.
    fn into_inbound(mut self, contacts: &[Contact], is_echo: bool) -> Option<InboundEvent> {
        let chat = if is_echo {
            match self.to.take() {
                Some(to) => to,
                None => {
                    warn!(message_id = %self.id, "message echo without a recipient, dropping");
                    return None;
                }
            }
        } else {
            self.group_id.clone().unwrap_or_else(|| self.from.clone())
        };

        let sender_name = contacts
            .iter()
            .find(|c| c.wa_id == self.from)
            .and_then(|c| c.profile.as_ref())
            .and_then(|p| p.name.clone());

        let media = self.media_ref();
        let text = self
            .text
            .map(|t| t.body)
            .or_else(|| self.document.and_then(|d| d.caption))
            .or_else(|| self.image.and_then(|i| i.caption));

        if text.is_none() && media.is_none() {
            trace!(kind = %self.kind, "message carries no text or supported media");
        }

        let timestamp = self
            .timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now);

        let is_broadcast = chat.ends_with("@broadcast");

        Some(InboundEvent {
            id: MessageId(self.id),
            sender: SenderId(chat),
            sender_name,
            group_name: self.group_subject,
            text,
            media,
            is_self: is_echo,
            is_broadcast,
            timestamp,
        })
    }

    fn media_ref(&self) -> Option<MediaRef> {
        let attachment = self.document.as_ref().or(self.image.as_ref())?;
        Some(MediaRef {
            id: attachment.id.clone(),
            mime_type: attachment.mime_type.clone().unwrap_or_default(),
            filename: attachment.filename.clone(),
        })
    }
}

/// Request body for `POST /{version}/{phone_number_id}/messages`.
#[derive(Debug, Serialize)]
pub struct SendRequest {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Serialize)]
pub struct TextPayload {
    pub preview_url: bool,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ImagePayload {
    /// Media id returned by the upload endpoint.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl SendRequest {
    pub fn text(to: &SenderId, body: &str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to: to.as_str().to_string(),
            kind: "text",
            text: Some(TextPayload {
                preview_url: false,
                body: body.to_string(),
            }),
            image: None,
        }
    }

    pub fn image(to: &SenderId, media_id: String, caption: &str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to: to.as_str().to_string(),
            kind: "image",
            text: None,
            image: Some(ImagePayload {
                id: media_id,
                caption: (!caption.is_empty()).then(|| caption.to_string()),
            }),
        }
    }
}

/// Response from the messages endpoint.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentId>,
}

#[derive(Debug, Deserialize)]
pub struct SentId {
    pub id: String,
}

/// Response from the media upload endpoint.
#[derive(Debug, Deserialize)]
pub struct MediaUploadResponse {
    pub id: String,
}

/// Metadata behind a media id, including the short-lived download URL.
#[derive(Debug, Deserialize)]
pub struct MediaMetadata {
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Graph API error envelope.
#[derive(Debug, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GraphErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub code: i64,
}

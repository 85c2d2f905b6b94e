// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event constructors for tests.

use chrono::Utc;
use mynah_core::{InboundEvent, MediaRef, MessageId, SenderId};

fn base_event(sender: &str) -> InboundEvent {
    InboundEvent {
        id: MessageId(format!("test-{}", uuid::Uuid::new_v4())),
        sender: SenderId::from(sender),
        sender_name: None,
        group_name: None,
        text: None,
        media: None,
        is_self: false,
        is_broadcast: false,
        timestamp: Utc::now(),
    }
}

/// A plain inbound text message from the given sender.
pub fn inbound_text(sender: &str, text: &str) -> InboundEvent {
    InboundEvent {
        text: Some(text.to_string()),
        ..base_event(sender)
    }
}

/// A media-only inbound message from the given sender.
pub fn inbound_media(sender: &str, media: MediaRef) -> InboundEvent {
    InboundEvent {
        media: Some(media),
        ..base_event(sender)
    }
}

/// A message sent by the bot's own account to the given recipient.
pub fn self_text(recipient: &str, text: &str) -> InboundEvent {
    InboundEvent {
        text: Some(text.to_string()),
        is_self: true,
        ..base_event(recipient)
    }
}

/// A broadcast-origin message from the given sender.
pub fn broadcast_text(sender: &str, text: &str) -> InboundEvent {
    InboundEvent {
        text: Some(text.to_string()),
        is_broadcast: true,
        ..base_event(sender)
    }
}

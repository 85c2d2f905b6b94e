// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender buffering of messages that arrive while not ready.

use std::collections::HashMap;
use std::mem;

use chrono::{DateTime, Utc};
use mynah_core::{MynahError, SenderId};
use tracing::debug;

/// One buffered inbound message awaiting the readiness drain.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub payload: String,
    pub arrived_at: DateTime<Utc>,
    pub is_group: bool,
}

/// Ordered per-sender buffers of undelivered inbound messages.
///
/// Depth is capped per sender to bound memory while the session is down;
/// [`MynahError::QueueFull`] signals overflow and the caller drops the
/// message silently.
pub struct OfflineQueue {
    queues: HashMap<SenderId, Vec<QueuedMessage>>,
    max_depth: usize,
}

impl OfflineQueue {
    pub fn new(max_depth: usize) -> Self {
        Self {
            queues: HashMap::new(),
            max_depth,
        }
    }

    /// Appends to the sender's buffer, failing once the depth cap is hit.
    pub fn enqueue(
        &mut self,
        identity: &SenderId,
        payload: String,
        is_group: bool,
    ) -> Result<(), MynahError> {
        let queue = self.queues.entry(identity.clone()).or_default();
        if queue.len() >= self.max_depth {
            return Err(MynahError::QueueFull {
                identity: identity.to_string(),
                depth: self.max_depth,
            });
        }
        queue.push(QueuedMessage {
            payload,
            arrived_at: Utc::now(),
            is_group,
        });
        debug!(identity = %identity, depth = queue.len(), "buffered offline message");
        Ok(())
    }

    /// Whether the sender already has buffered messages. Doubles as the
    /// "throttle notice already sent" signal during an offline episode.
    pub fn has_pending(&self, identity: &SenderId) -> bool {
        self.queues.get(identity).is_some_and(|q| !q.is_empty())
    }

    pub fn depth(&self, identity: &SenderId) -> usize {
        self.queues.get(identity).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(Vec::is_empty)
    }

    /// Takes every buffer, leaving the queue empty.
    ///
    /// The single drain pass consumes the result; entries the pass does not
    /// individually reply to are gone with it.
    pub fn take_all(&mut self) -> Vec<(SenderId, Vec<QueuedMessage>)> {
        mem::take(&mut self.queues)
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }
}

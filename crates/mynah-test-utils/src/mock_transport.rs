// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport` with injectable transport
//! events and captured outbound sends for assertion in tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use mynah_core::types::TransportCapabilities;
use mynah_core::{
    Adapter, AdapterType, ChatTransport, HealthStatus, MediaRef, MessageId, MynahError,
    SenderId, TransportEvent,
};

/// One outbound message captured by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        to: SenderId,
        text: String,
    },
    Media {
        to: SenderId,
        path: PathBuf,
        caption: String,
    },
}

/// A mock chat transport for testing.
///
/// Provides two queues:
/// - **inbound**: Events injected via `push_event()` are returned by `receive()`
/// - **sent**: Sends are captured and retrievable via `sent_messages()`
///
/// Once `close()` is called, `receive()` reports a closed transport after
/// the inbound queue empties, which ends the agent loop.
pub struct MockTransport {
    inbound: Arc<Mutex<VecDeque<TransportEvent>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    media: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    notify: Arc<Notify>,
    closed: AtomicBool,
    fail_next_send: AtomicBool,
    typing_sent: AtomicUsize,
    shut_down: AtomicBool,
}

impl MockTransport {
    /// Create a new mock transport with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            media: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            fail_next_send: AtomicBool::new(false),
            typing_sent: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Inject a transport event into the receive queue.
    ///
    /// The next call to `receive()` will return this event.
    pub async fn push_event(&self, event: TransportEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Mark the transport closed. `receive()` drains queued events first,
    /// then returns a closed-transport error.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Register media bytes retrievable through `fetch_media()`.
    pub async fn add_media(&self, id: &str, bytes: Vec<u8>) {
        self.media.lock().await.insert(id.to_string(), bytes);
    }

    /// Make the next `send_text()` or `send_media()` call fail.
    pub async fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    /// Get all captured outbound messages.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of captured outbound messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all captured outbound messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Number of typing indicators signalled so far.
    pub fn typing_count(&self) -> usize {
        self.typing_sent.load(Ordering::SeqCst)
    }

    /// Whether `shutdown()` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn take_send_failure(&self) -> Result<(), MynahError> {
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(MynahError::TransportSend {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, MynahError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MynahError> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities {
            supports_images: true,
            supports_documents: true,
            supports_typing: true,
            max_message_length: None,
        }
    }

    async fn connect(&mut self) -> Result<(), MynahError> {
        Ok(())
    }

    async fn receive(&self) -> Result<TransportEvent, MynahError> {
        loop {
            // Try to pop from queue
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(MynahError::Transport {
                    message: "transport closed".to_string(),
                    source: None,
                });
            }
            // Wait for notification that a new event was injected
            self.notify.notified().await;
        }
    }

    async fn send_text(&self, to: &SenderId, text: &str) -> Result<MessageId, MynahError> {
        self.take_send_failure()?;
        self.sent.lock().await.push(SentMessage::Text {
            to: to.clone(),
            text: text.to_string(),
        });
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }

    async fn send_typing(&self, _to: &SenderId) -> Result<(), MynahError> {
        self.typing_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_media(
        &self,
        to: &SenderId,
        media: &Path,
        caption: &str,
    ) -> Result<MessageId, MynahError> {
        self.take_send_failure()?;
        self.sent.lock().await.push(SentMessage::Media {
            to: to.clone(),
            path: media.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, MynahError> {
        self.media
            .lock()
            .await
            .get(&media.id)
            .cloned()
            .ok_or_else(|| MynahError::Transport {
                message: format!("no media registered for id {}", media.id),
                source: None,
            })
    }
}

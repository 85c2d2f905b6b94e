// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mynah chat-relay agent.

use thiserror::Error;

/// The primary error type used across all Mynah adapter traits and the
/// admission pipeline.
#[derive(Debug, Error)]
pub enum MynahError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Sender is not on the allow-list. Dropped silently, never answered.
    #[error("sender not allowed: {identity}")]
    NotAllowed { identity: String },

    /// Sender exceeded the offline burst threshold. Warned once per offline
    /// episode, then dropped silently.
    #[error("sender throttled while offline: {identity}")]
    ThrottledOffline { identity: String },

    /// Per-sender offline queue reached its depth cap.
    #[error("offline queue full for {identity} (depth {depth})")]
    QueueFull { identity: String, depth: usize },

    /// Response generation failed (LLM API failure, image backend exhausted).
    /// Caught at the pipeline boundary and answered with an apology.
    #[error("generation failed: {message}")]
    GenerationFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Document text extraction failed (unreadable or unsupported media).
    #[error("extraction failed: {message}")]
    ExtractionFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport-level errors on the receive path (connection, webhook decode,
    /// media download).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An outbound send failed. Logged and surfaced to the caller, never
    /// retried by the pipeline.
    #[error("transport send failed: {message}")]
    TransportSend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MynahError {
    /// Errors that the pipeline drops without any user-facing reply.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            MynahError::NotAllowed { .. } | MynahError::QueueFull { .. }
        )
    }
}

// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mynah chat-relay agent.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Mynah workspace. Transport, generator,
//! and extractor adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MynahError;
pub use types::{
    AdapterType, GenerationRequest, HealthStatus, InboundEvent, MediaRef, MessageId,
    Readiness, Reply, SenderId, TransportEvent,
};

// Re-export all adapter traits at crate root.
pub use traits::{Adapter, ChatTransport, DocumentExtractor, GeneratorOutcome, ResponseGenerator};

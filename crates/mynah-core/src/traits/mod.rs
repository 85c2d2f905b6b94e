// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Mynah's collaborator boundaries.
//!
//! All adapters extend the [`Adapter`] base trait and use `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod adapter;
pub mod extractor;
pub mod generator;
pub mod transport;

// Re-export all traits at the traits module level for convenience.
pub use adapter::Adapter;
pub use extractor::DocumentExtractor;
pub use generator::{GeneratorOutcome, ResponseGenerator};
pub use transport::ChatTransport;

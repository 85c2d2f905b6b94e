// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mynah integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock chat transport with event injection and send capture
//! - [`MockGenerator`] - Mock response generator with scripted outcomes
//! - [`MockExtractor`] - Mock document extractor with fixed text or failure
//! - [`TestHarness`] - A fully assembled admission pipeline over the mocks

pub mod events;
pub mod harness;
pub mod mock_extractor;
pub mod mock_generator;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_extractor::MockExtractor;
pub use mock_generator::MockGenerator;
pub use mock_transport::{MockTransport, SentMessage};

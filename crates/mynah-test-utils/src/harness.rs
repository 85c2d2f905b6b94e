// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete admission pipeline over mock adapters.
//! Tests drive it with `deliver_text()` and readiness toggles, then assert
//! on the transport's captured sends.

use std::sync::Arc;

use mynah_agent::AdmissionPipeline;
use mynah_config::model::MynahConfig;
use mynah_core::{InboundEvent, MynahError, Readiness};
use tokio::sync::watch;

use crate::events::inbound_text;
use crate::mock_extractor::MockExtractor;
use crate::mock_generator::MockGenerator;
use crate::mock_transport::{MockTransport, SentMessage};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: MynahConfig,
    responses: Vec<String>,
    extracted_text: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: MynahConfig::default(),
            responses: Vec::new(),
            extracted_text: "extracted document text".to_string(),
        }
    }

    /// Set mock generator text replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: MynahConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the allow-list, routing identities to the user or group list by
    /// their suffix.
    pub fn with_pre_approved(mut self, identities: &[&str]) -> Self {
        for identity in identities {
            if identity.ends_with("@g.us") {
                self.config
                    .allowlist
                    .pre_approved_groups
                    .push(identity.to_string());
            } else {
                self.config
                    .allowlist
                    .pre_approved_users
                    .push(identity.to_string());
            }
        }
        self
    }

    /// Set the text the mock extractor returns for every document.
    pub fn with_extracted_text(mut self, text: &str) -> Self {
        self.extracted_text = text.to_string();
        self
    }

    /// Build the test harness. The pipeline starts not ready.
    pub fn build(self) -> TestHarness {
        let transport = Arc::new(MockTransport::new());
        let extractor = Arc::new(MockExtractor::with_text(&self.extracted_text));

        let generator = Arc::new(if self.responses.is_empty() {
            MockGenerator::new()
        } else {
            MockGenerator::with_responses(self.responses)
        });

        let (pipeline, readiness_rx) = AdmissionPipeline::new(
            transport.clone(),
            generator.clone(),
            extractor.clone(),
            &self.config,
        );

        TestHarness {
            transport,
            generator,
            extractor,
            pipeline,
            readiness_rx,
            config: self.config,
        }
    }
}

/// A complete test environment with mock adapters and a live pipeline.
pub struct TestHarness {
    /// The mock transport, for event injection and send assertions.
    pub transport: Arc<MockTransport>,
    /// The mock response generator.
    pub generator: Arc<MockGenerator>,
    /// The mock document extractor.
    pub extractor: Arc<MockExtractor>,
    /// The admission pipeline under test.
    pub pipeline: AdmissionPipeline,
    /// Mirrors pipeline readiness, as the gateway would see it.
    pub readiness_rx: watch::Receiver<Readiness>,
    /// The configuration the pipeline was built with.
    pub config: MynahConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Move the pipeline to ready, draining any buffered messages.
    pub async fn go_ready(&mut self) {
        self.pipeline.transition(Readiness::Ready).await;
    }

    /// Move the pipeline to not-ready.
    pub async fn go_offline(&mut self) {
        self.pipeline.transition(Readiness::NotReady).await;
    }

    /// Run one inbound event through the pipeline.
    pub async fn deliver(&mut self, event: InboundEvent) -> Result<(), MynahError> {
        self.pipeline.handle_inbound(event).await
    }

    /// Run one inbound text message through the pipeline.
    pub async fn deliver_text(&mut self, sender: &str, text: &str) -> Result<(), MynahError> {
        self.deliver(inbound_text(sender, text)).await
    }

    /// All captured text sends, in order, media sends skipped.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.transport
            .sent_messages()
            .await
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text { text, .. } => Some(text),
                SentMessage::Media { .. } => None,
            })
            .collect()
    }
}

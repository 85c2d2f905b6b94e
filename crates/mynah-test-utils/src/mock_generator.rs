// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock response generator for deterministic testing.
//!
//! `MockGenerator` implements `ResponseGenerator` with scripted outcomes,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mynah_core::{
    Adapter, AdapterType, GenerationRequest, GeneratorOutcome, HealthStatus, MynahError,
    Reply, ResponseGenerator,
};

/// One scripted generator result. Failures are scripted by message since
/// `MynahError` is not cloneable.
enum Scripted {
    Outcome(GeneratorOutcome),
    Failure(String),
}

/// A mock generator that returns scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, a
/// default "mock response" text reply is returned. Every request is
/// recorded for assertion via `requests()`.
pub struct MockGenerator {
    outcomes: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    /// Create a new mock generator with an empty outcome queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock generator pre-loaded with the given text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let queue = responses
            .into_iter()
            .map(|text| Scripted::Outcome(GeneratorOutcome::Reply(Reply::Text(text))))
            .collect();
        Self {
            outcomes: Arc::new(Mutex::new(queue)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a plain text reply.
    pub async fn push_text(&self, text: &str) {
        self.outcomes
            .lock()
            .await
            .push_back(Scripted::Outcome(GeneratorOutcome::Reply(Reply::Text(
                text.to_string(),
            ))));
    }

    /// Queue an arbitrary outcome.
    pub async fn push_outcome(&self, outcome: GeneratorOutcome) {
        self.outcomes
            .lock()
            .await
            .push_back(Scripted::Outcome(outcome));
    }

    /// Queue a generation failure with the given message.
    pub async fn push_failure(&self, message: &str) {
        self.outcomes
            .lock()
            .await
            .push_back(Scripted::Failure(message.to_string()));
    }

    /// Get all requests seen so far, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, MynahError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MynahError> {
        Ok(())
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratorOutcome, MynahError> {
        self.requests.lock().await.push(request);

        match self.outcomes.lock().await.pop_front() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Failure(message)) => Err(MynahError::GenerationFailed {
                message,
                source: None,
            }),
            None => Ok(GeneratorOutcome::Reply(Reply::Text(
                "mock response".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> GenerationRequest {
        GenerationRequest {
            text: text.to_string(),
            ..GenerationRequest::default()
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let generator = MockGenerator::new();
        let outcome = generator.generate(request("hello")).await.unwrap();
        assert_eq!(
            outcome,
            GeneratorOutcome::Reply(Reply::Text("mock response".to_string()))
        );
    }

    #[tokio::test]
    async fn queued_outcomes_returned_in_order() {
        let generator = MockGenerator::with_responses(vec![
            "first".to_string(),
            "second".to_string(),
        ]);

        assert_eq!(
            generator.generate(request("a")).await.unwrap(),
            GeneratorOutcome::Reply(Reply::Text("first".to_string()))
        );
        assert_eq!(
            generator.generate(request("b")).await.unwrap(),
            GeneratorOutcome::Reply(Reply::Text("second".to_string()))
        );
        // Queue exhausted, falls back to default
        assert_eq!(
            generator.generate(request("c")).await.unwrap(),
            GeneratorOutcome::Reply(Reply::Text("mock response".to_string()))
        );
    }

    #[tokio::test]
    async fn scripted_failure_surfaces_as_generation_error() {
        let generator = MockGenerator::new();
        generator.push_failure("backend down").await;

        let err = generator.generate(request("hello")).await.unwrap_err();
        assert!(matches!(err, MynahError::GenerationFailed { .. }));
        assert!(err.to_string().contains("backend down"));
    }

    #[tokio::test]
    async fn requests_are_recorded_in_order() {
        let generator = MockGenerator::new();
        generator.generate(request("one")).await.unwrap();
        generator.generate(request("two")).await.unwrap();

        let seen = generator.requests().await;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].text, "one");
        assert_eq!(seen[1].text, "two");
    }

    #[tokio::test]
    async fn push_outcome_scripts_non_text_results() {
        let generator = MockGenerator::new();
        generator
            .push_outcome(GeneratorOutcome::ClearConversation {
                confirmation: "cleared".to_string(),
            })
            .await;

        assert_eq!(
            generator.generate(request("/clear")).await.unwrap(),
            GeneratorOutcome::ClearConversation {
                confirmation: "cleared".to_string(),
            }
        );
    }
}

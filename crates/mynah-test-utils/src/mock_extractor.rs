// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock document extractor for deterministic testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use mynah_core::{Adapter, AdapterType, DocumentExtractor, HealthStatus, MynahError};

/// A mock extractor that returns fixed text, or fails every call.
pub struct MockExtractor {
    text: String,
    fail: bool,
    calls: AtomicUsize,
}

impl MockExtractor {
    /// Create an extractor that returns the given text for every document.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create an extractor that fails every call.
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of extraction attempts seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Adapter for MockExtractor {
    fn name(&self) -> &str {
        "mock-extractor"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Extractor
    }

    async fn health_check(&self) -> Result<HealthStatus, MynahError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MynahError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract(&self, _bytes: &[u8]) -> Result<String, MynahError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MynahError::ExtractionFailed {
                message: "mock extraction failure".to_string(),
                source: None,
            });
        }
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_text_returns_fixed_text_and_counts_calls() {
        let extractor = MockExtractor::with_text("document body");
        assert_eq!(extractor.call_count(), 0);

        assert_eq!(extractor.extract(b"pdf").await.unwrap(), "document body");
        assert_eq!(extractor.extract(b"other").await.unwrap(), "document body");
        assert_eq!(extractor.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_extractor_errors_every_call() {
        let extractor = MockExtractor::failing();
        let err = extractor.extract(b"pdf").await.unwrap_err();
        assert!(matches!(err, MynahError::ExtractionFailed { .. }));
        assert_eq!(extractor.call_count(), 1);
    }
}

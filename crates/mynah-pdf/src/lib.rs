// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PDF text extraction adapter for the Mynah agent.
//!
//! Wraps the `pdf-extract` crate behind [`DocumentExtractor`]. Extraction is
//! CPU-bound, so it runs on the blocking thread pool.

use async_trait::async_trait;
use mynah_core::types::{AdapterType, HealthStatus};
use mynah_core::{Adapter, DocumentExtractor, MynahError};
use tracing::debug;

/// Extracts plain text from PDF attachments.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Adapter for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
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
        debug!("PDF extractor shutting down");
        Ok(())
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, MynahError> {
        let owned = bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&owned)
        })
        .await
        .map_err(|e| MynahError::Internal(format!("extraction task failed: {e}")))?
        .map_err(|e| MynahError::ExtractionFailed {
            message: format!("failed to extract PDF text: {e}"),
            source: Some(Box::new(e)),
        })?;

        normalize(text)
    }
}

/// Trims extractor output and rejects documents with no visible text
/// (scanned images extract to whitespace).
fn normalize(text: String) -> Result<String, MynahError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MynahError::ExtractionFailed {
            message: "document contains no extractable text".into(),
            source: None,
        });
    }
    Ok(trimmed.to_string())
}

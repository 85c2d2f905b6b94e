// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document text extraction trait.

use async_trait::async_trait;

use crate::error::MynahError;
use crate::traits::adapter::Adapter;

/// Adapter for pulling plain text out of document attachments.
#[async_trait]
pub trait DocumentExtractor: Adapter {
    /// Extracts text from document bytes.
    ///
    /// Returns [`MynahError::ExtractionFailed`] for unreadable or
    /// unsupported documents.
    async fn extract(&self, bytes: &[u8]) -> Result<String, MynahError>;
}

// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generator trait for generative backends.

use async_trait::async_trait;

use crate::error::MynahError;
use crate::traits::adapter::Adapter;
use crate::types::{GenerationRequest, Reply};

/// Adapter for turning message text plus conversation context into a reply.
///
/// Command prefixes (clear-conversation, image directives) are recognized by
/// the generator, not by the admission pipeline; the pipeline only routes.
/// A clear directive is reported back through [`GeneratorOutcome`] so the
/// pipeline can drop the conversation log it owns.
#[async_trait]
pub trait ResponseGenerator: Adapter {
    /// Produces a reply for one inbound message.
    ///
    /// Failures surface as [`MynahError::GenerationFailed`]; the pipeline
    /// converts them into an apology reply and leaves the conversation
    /// cache untouched.
    async fn generate(&self, request: GenerationRequest)
        -> Result<GeneratorOutcome, MynahError>;
}

/// What the generator produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorOutcome {
    /// A normal reply. Appended to conversation memory by the pipeline.
    Reply(Reply),
    /// The message was a clear-conversation directive. The pipeline clears
    /// the sender's log and sends the confirmation text without recording
    /// a turn.
    ClearConversation { confirmation: String },
    /// Feedback about the request itself (image prompt too short, image
    /// backend unavailable). Sent to the sender but never recorded as a
    /// conversation turn.
    Advisory(String),
}

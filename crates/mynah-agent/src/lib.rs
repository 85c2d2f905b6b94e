// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent loop and message admission for the Mynah chat-relay agent.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives events from a chat transport
//! - Routes them through the admission pipeline
//! - Forces the pipeline offline when event handling fails
//! - Handles graceful shutdown

pub mod allowlist;
pub mod burst;
pub mod memory;
pub mod offline;
pub mod pipeline;
pub mod replies;
pub mod shutdown;

use std::sync::Arc;

use mynah_config::model::MynahConfig;
use mynah_core::{
    ChatTransport, DocumentExtractor, MynahError, Readiness, ResponseGenerator,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use crate::pipeline::AdmissionPipeline;

/// The main agent loop that pulls transport events and drives the admission
/// pipeline.
///
/// The loop owns the pipeline exclusively, so every event is handled to
/// completion before the next one is looked at. That serialization is what
/// keeps the admission state consistent without locks.
pub struct AgentLoop {
    transport: Arc<dyn ChatTransport>,
    pipeline: AdmissionPipeline,
}

impl AgentLoop {
    /// Creates an agent loop around the given adapters.
    ///
    /// The returned watch receiver reports pipeline readiness to operator
    /// surfaces such as the gateway health endpoint.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        generator: Arc<dyn ResponseGenerator>,
        extractor: Arc<dyn DocumentExtractor>,
        config: &MynahConfig,
    ) -> (Self, watch::Receiver<Readiness>) {
        let (pipeline, readiness_rx) =
            AdmissionPipeline::new(transport.clone(), generator, extractor, config);

        info!(
            agent_name = config.agent.name.as_str(),
            "agent loop initialized"
        );

        (
            Self {
                transport,
                pipeline,
            },
            readiness_rx,
        )
    }

    /// Runs the main agent loop until the cancellation token is triggered.
    ///
    /// Events are handled strictly one at a time. When handling fails with
    /// an error the pipeline could not absorb, the pipeline is forced to
    /// not-ready so later messages buffer instead of hitting the same
    /// failure; the loop itself keeps running.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), MynahError> {
        info!("agent loop running");

        loop {
            tokio::select! {
                event = self.transport.receive() => {
                    match event {
                        Ok(event) => {
                            if let Err(e) = self.pipeline.handle_event(event).await {
                                error!(error = %e, "failed to handle transport event");
                                self.pipeline.transition(Readiness::NotReady).await;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "transport receive error");
                            // If the transport is closed, break out of the loop.
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        self.transport.shutdown().await?;

        info!("agent loop stopped");
        Ok(())
    }
}

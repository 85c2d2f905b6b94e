// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mynah serve` command implementation.
//!
//! Starts the full agent: WhatsApp Cloud API transport, Gemini response
//! generator with the HuggingFace image backend, PDF extractor, admission
//! pipeline, and the operator gateway. Runs until SIGINT/SIGTERM.

use std::sync::Arc;

use mynah_agent::shutdown;
use mynah_agent::AgentLoop;
use mynah_config::MynahConfig;
use mynah_core::{
    Adapter, ChatTransport, DocumentExtractor, HealthStatus, MynahError, ResponseGenerator,
};
use mynah_gateway::GatewayServer;
use mynah_gemini::GeminiGenerator;
use mynah_pdf::PdfExtractor;
use mynah_whatsapp::WhatsAppTransport;
use tracing::{debug, error, info, warn};

/// Runs the `mynah serve` command.
///
/// Builds every adapter from configuration, wires them into the agent
/// loop, and serves until a shutdown signal arrives. Adapter construction
/// failures are fatal; a failing startup health probe is not, since the
/// admission pipeline is designed to buffer while the session is down.
pub async fn run_serve(config: MynahConfig) -> Result<(), MynahError> {
    init_tracing(&config.agent.log_level);

    info!(
        agent_name = config.agent.name.as_str(),
        "starting mynah serve"
    );

    // The transport is connected before it is shared: connect binds the
    // webhook listener and needs exclusive access.
    let mut transport = WhatsAppTransport::new(config.whatsapp.clone()).map_err(|e| {
        error!(error = %e, "failed to initialize WhatsApp transport");
        eprintln!(
            "error: WhatsApp Cloud API credentials required. Set whatsapp.access_token, \
             whatsapp.phone_number_id, and whatsapp.verify_token via config or \
             MYNAH_WHATSAPP_* environment variables."
        );
        e
    })?;
    transport.connect().await?;
    let transport: Arc<dyn ChatTransport> = Arc::new(transport);

    match transport.health_check().await {
        Ok(HealthStatus::Healthy) => info!("WhatsApp Cloud API credentials verified"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(reason = reason.as_str(), "transport degraded at startup");
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(
                reason = reason.as_str(),
                "transport unhealthy at startup, messages will buffer until the session recovers"
            );
        }
        Err(e) => warn!(error = %e, "transport startup health probe failed"),
    }

    let generator: Arc<dyn ResponseGenerator> =
        Arc::new(GeminiGenerator::new(&config).map_err(|e| {
            error!(error = %e, "failed to initialize Gemini generator");
            eprintln!(
                "error: Gemini API key required. Set gemini.api_key via config or the \
                 GEMINI_API_KEY environment variable."
            );
            e
        })?);

    let extractor: Arc<dyn DocumentExtractor> = Arc::new(PdfExtractor::new());

    let (mut agent_loop, readiness_rx) =
        AgentLoop::new(transport, generator, extractor, &config);

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    if config.gateway.enabled {
        let gateway = GatewayServer::new(config.gateway.clone(), readiness_rx);
        let gateway_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway.run(gateway_cancel).await {
                error!(error = %e, "operator gateway exited with error");
            }
        });
    } else {
        debug!("operator gateway disabled by configuration");
    }

    agent_loop.run(cancel).await?;

    info!("mynah serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mynah={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

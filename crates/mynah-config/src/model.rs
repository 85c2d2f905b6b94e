// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mynah chat-relay agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mynah configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MynahConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Pre-approved identities and auto-approval switches.
    #[serde(default)]
    pub allowlist: AllowlistConfig,

    /// Admission pipeline tuning (memory cap, burst window, queue depth).
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Gemini text-generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// HuggingFace image-generation settings.
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    /// WhatsApp Cloud API transport settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Operator HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent, used in welcome messages.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "Mynah".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Allow-list seeding and auto-approval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AllowlistConfig {
    /// Individual identities approved at startup.
    #[serde(default)]
    pub pre_approved_users: Vec<String>,

    /// Group identities approved at startup. Must carry the `@g.us` suffix.
    #[serde(default)]
    pub pre_approved_groups: Vec<String>,

    /// Approve unknown individuals on first contact.
    #[serde(default = "default_auto_approve")]
    pub auto_approve_individuals: bool,

    /// Approve unknown groups on first contact.
    #[serde(default = "default_auto_approve")]
    pub auto_approve_groups: bool,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            pre_approved_users: Vec::new(),
            pre_approved_groups: Vec::new(),
            auto_approve_individuals: default_auto_approve(),
            auto_approve_groups: default_auto_approve(),
        }
    }
}

fn default_auto_approve() -> bool {
    true
}

/// Admission pipeline tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionConfig {
    /// Maximum turns retained per conversation (FIFO eviction beyond this).
    #[serde(default = "default_memory_max_turns")]
    pub memory_max_turns: usize,

    /// Number of most-recent turns rendered into prompt context.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Trailing window for burst detection, in seconds.
    #[serde(default = "default_burst_window_secs")]
    pub burst_window_secs: u64,

    /// Arrivals within the window beyond which a sender counts as bursting.
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: usize,

    /// Per-sender offline queue depth cap.
    #[serde(default = "default_offline_queue_depth")]
    pub offline_queue_depth: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            memory_max_turns: default_memory_max_turns(),
            context_turns: default_context_turns(),
            burst_window_secs: default_burst_window_secs(),
            burst_threshold: default_burst_threshold(),
            offline_queue_depth: default_offline_queue_depth(),
        }
    }
}

fn default_memory_max_turns() -> usize {
    10
}

fn default_context_turns() -> usize {
    5
}

fn default_burst_window_secs() -> u64 {
    300
}

fn default_burst_threshold() -> usize {
    3
}

fn default_offline_queue_depth() -> usize {
    32
}

/// Gemini text-generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for text generation.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Top-k sampling cutoff.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Maximum output tokens for direct-message replies.
    #[serde(default = "default_max_tokens_private")]
    pub max_tokens_private: u32,

    /// Maximum output tokens for group replies. Kept lower so group chats
    /// stay readable.
    #[serde(default = "default_max_tokens_group")]
    pub max_tokens_group: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_tokens_private: default_max_tokens_private(),
            max_tokens_group: default_max_tokens_group(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f64 {
    0.95
}

fn default_max_tokens_private() -> u32 {
    1024
}

fn default_max_tokens_group() -> u32 {
    512
}

/// HuggingFace image-generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HuggingFaceConfig {
    /// HuggingFace API token. `None` requires the environment variable.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Hosted models tried in order until one succeeds.
    #[serde(default = "default_image_models")]
    pub models: Vec<String>,

    /// Seconds to wait before the single retry when a model reports 503
    /// (still loading).
    #[serde(default = "default_model_wait_secs")]
    pub model_wait_secs: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            models: default_image_models(),
            model_wait_secs: default_model_wait_secs(),
        }
    }
}

fn default_image_models() -> Vec<String> {
    vec![
        "black-forest-labs/FLUX.1-schnell".to_string(),
        "black-forest-labs/FLUX.1-dev".to_string(),
        "stabilityai/stable-diffusion-xl-base-1.0".to_string(),
        "runwayml/stable-diffusion-v1-5".to_string(),
    ]
}

fn default_model_wait_secs() -> u64 {
    15
}

/// WhatsApp Cloud API transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Cloud API access token. `None` requires the environment variable.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Business phone number id used on the send path.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Token the webhook verification handshake must echo.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret used to check `X-Hub-Signature-256` on notifications.
    /// `None` disables signature checking (local development only).
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API version used on the send path.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Address the webhook server binds to.
    #[serde(default = "default_webhook_bind")]
    pub bind_address: String,

    /// Port the webhook server binds to.
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            app_secret: None,
            api_version: default_api_version(),
            bind_address: default_webhook_bind(),
            webhook_port: default_webhook_port(),
        }
    }
}

fn default_api_version() -> String {
    "v20.0".to_string()
}

fn default_webhook_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_webhook_port() -> u16 {
    8080
}

/// Operator HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Enable the operator gateway.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Address the gateway binds to.
    #[serde(default = "default_gateway_bind")]
    pub bind_address: String,

    /// Port the gateway binds to.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            bind_address: default_gateway_bind(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

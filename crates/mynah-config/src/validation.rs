// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as identity suffix shapes, sampling ranges, and
//! consistent window sizes.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::MynahConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MynahConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.admission.memory_max_turns == 0 {
        errors.push(ConfigError::Validation {
            message: "admission.memory_max_turns must be at least 1".to_string(),
        });
    }

    if config.admission.context_turns == 0 {
        errors.push(ConfigError::Validation {
            message: "admission.context_turns must be at least 1".to_string(),
        });
    } else if config.admission.context_turns > config.admission.memory_max_turns {
        errors.push(ConfigError::Validation {
            message: format!(
                "admission.context_turns ({}) must not exceed admission.memory_max_turns ({})",
                config.admission.context_turns, config.admission.memory_max_turns
            ),
        });
    }

    if config.admission.burst_window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "admission.burst_window_secs must be at least 1".to_string(),
        });
    }

    if config.admission.offline_queue_depth == 0 {
        errors.push(ConfigError::Validation {
            message: "admission.offline_queue_depth must be at least 1".to_string(),
        });
    }

    // Identity namespaces are disjoint; catch entries filed under the wrong
    // list before they silently never match.
    for user in &config.allowlist.pre_approved_users {
        if user.ends_with("@g.us") {
            errors.push(ConfigError::Validation {
                message: format!(
                    "allowlist.pre_approved_users entry `{user}` is a group identity; move it to pre_approved_groups"
                ),
            });
        }
    }
    for group in &config.allowlist.pre_approved_groups {
        if !group.ends_with("@g.us") {
            errors.push(ConfigError::Validation {
                message: format!(
                    "allowlist.pre_approved_groups entry `{group}` is not a group identity (missing `@g.us` suffix)"
                ),
            });
        }
    }

    let mut seen = HashSet::new();
    for id in config
        .allowlist
        .pre_approved_users
        .iter()
        .chain(&config.allowlist.pre_approved_groups)
    {
        if !seen.insert(id) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate allowlist entry `{id}`"),
            });
        }
    }

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.temperature must be between 0.0 and 2.0, got {}",
                config.gemini.temperature
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.gemini.top_p) {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.top_p must be between 0.0 and 1.0, got {}",
                config.gemini.top_p
            ),
        });
    }

    if config.huggingface.models.is_empty() {
        errors.push(ConfigError::Validation {
            message: "huggingface.models must list at least one model".to_string(),
        });
    }

    for (section, addr) in [
        ("whatsapp.bind_address", &config.whatsapp.bind_address),
        ("gateway.bind_address", &config.gateway.bind_address),
    ] {
        let addr = addr.trim();
        if addr.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{section} must not be empty"),
            });
            continue;
        }
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("{section} `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.gateway.enabled && config.gateway.port == config.whatsapp.webhook_port {
        errors.push(ConfigError::Validation {
            message: format!(
                "gateway.port and whatsapp.webhook_port must differ (both {})",
                config.gateway.port
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

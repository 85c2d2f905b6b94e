// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Mynah chat-relay agent.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and Elm-style diagnostic error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use mynah_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Agent name: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MynahConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
///
/// Returns either a valid `MynahConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<MynahConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            // Read TOML source files for error source span information
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<MynahConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    // Local config
    if let Ok(content) = std::fs::read_to_string("mynah.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("mynah.toml").display().to_string())
            .unwrap_or_else(|_| "mynah.toml".to_string());
        sources.push((path, content));
    }

    // XDG user config
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("mynah/mynah.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    // System config
    let system_path = std::path::Path::new("/etc/mynah/mynah.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_accepts_valid_config() {
        let toml = r#"
[allowlist]
pre_approved_users = ["94771234567@c.us"]

[gemini]
api_key = "test-key"
"#;
        let config = load_and_validate_str(toml).unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn load_and_validate_str_reports_typo_with_suggestion() {
        let toml = r#"
[admission]
burst_treshold = 5
"#;
        let errors = load_and_validate_str(toml).unwrap_err();
        assert!(!errors.is_empty());
        let has_suggestion = errors.iter().any(|e| {
            matches!(
                e,
                ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "burst_threshold"
            )
        });
        assert!(has_suggestion, "expected a burst_threshold suggestion");
    }

    #[test]
    fn load_and_validate_str_collects_validation_errors() {
        let toml = r#"
[admission]
memory_max_turns = 0
burst_window_secs = 0
"#;
        let errors = load_and_validate_str(toml).unwrap_err();
        // Both violations reported, not just the first.
        assert!(errors.len() >= 2);
    }
}

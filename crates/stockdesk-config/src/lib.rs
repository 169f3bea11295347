// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Stockdesk inventory client.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment
//! variable overrides, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use stockdesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("server: {}", config.server.base_url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::DeskConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<DeskConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a specific TOML file and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<DeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<DeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_inline_config_loads() {
        let config = load_and_validate_str(
            r#"
            [server]
            base_url = "https://inventory.example.org"
            timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://inventory.example.org");
    }

    #[test]
    fn semantic_errors_surface_as_diagnostics() {
        let errors = load_and_validate_str(
            r#"
            [server]
            timeout_secs = 0
            "#,
        )
        .unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.to_string().contains("timeout_secs"))
        );
    }

    #[test]
    fn unknown_section_key_is_a_diagnostic() {
        let errors = load_and_validate_str(
            r#"
            [client]
            log_lvl = "debug"
            "#,
        )
        .unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::UnknownKey { .. }))
        );
    }
}

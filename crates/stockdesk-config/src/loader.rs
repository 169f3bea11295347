// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./stockdesk.toml` > `~/.config/stockdesk/stockdesk.toml`
//! > `/etc/stockdesk/stockdesk.toml` with environment variable overrides
//! via `STOCKDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/stockdesk/stockdesk.toml` (system-wide)
/// 3. `~/.config/stockdesk/stockdesk.toml` (user XDG config)
/// 4. `./stockdesk.toml` (local directory)
/// 5. `STOCKDESK_*` environment variables
pub fn load_config() -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file("/etc/stockdesk/stockdesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("stockdesk/stockdesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("stockdesk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` so that underscore-containing
/// key names stay intact: `STOCKDESK_SERVER_BASE_URL` must map to
/// `server.base_url`, not `server.base.url`.
fn env_provider() -> Env {
    Env::prefixed("STOCKDESK_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a config key path.
/// Example: `STOCKDESK_SERVER_BASE_URL` arrives as "server_base_url"
/// and maps to "server.base_url".
fn map_env_key(key: &str) -> String {
    key.replacen("server_", "server.", 1)
        .replacen("client_", "client.", 1)
        .replacen("checkout_", "checkout.", 1)
}

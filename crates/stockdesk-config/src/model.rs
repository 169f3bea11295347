// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Stockdesk client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup, providing actionable error
//! messages.

use serde::{Deserialize, Serialize};

/// Top-level Stockdesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to
/// sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskConfig {
    /// Inventory server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Local client behavior settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Checkout/checkin workflow rules.
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

/// Inventory server connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the inventory API, without the `/api/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Bounds how long a submit can sit
    /// in flight before it surfaces as a transport error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Local client behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Checkout/checkin workflow rules.
///
/// Both flags exist because the server's behavior is authoritative
/// either way; they only decide how strict the client is before a
/// request goes out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutConfig {
    /// Clamp checkin counts to the borrow state's quantity. Disabling
    /// lets the server decide whether over-checkin is acceptable.
    #[serde(default = "default_true")]
    pub checkin_ceiling: bool,

    /// Reject a submit while another submission is still in flight.
    #[serde(default = "default_true")]
    pub single_flight: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            checkin_ceiling: true,
            single_flight: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Stockdesk inventory client.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::types::ItemCount;

/// Structured reason codes returned by the inventory API.
///
/// The snake_case form of each variant is the stable key an embedding
/// UI uses to look up localized message text, so renames here are
/// breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    AlreadyBorrowed,
    AuthenticationRequired,
    InsufficientPermissions,
    InvalidUserOrPassword,
    NoSuchObject,
    NoSuchUser,
    NonexistentItem,
    MissingFields,
    ValidationFailed,
    /// Catch-all for reason codes this client does not know about.
    #[serde(other)]
    Unknown,
}

/// The primary error type used across all Stockdesk crates.
///
/// Every variant leaves the selection ledger in a recoverable state;
/// nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Client-side precondition failures. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// A scanned token matched no known user or item. The caller keeps
    /// its input so the operator can correct it.
    #[error("nothing matches `{token}`")]
    NotFound { token: String },

    /// Checkout rejected because some selected items are already out.
    ///
    /// Carries the per-item counts still available, as reported by the
    /// server; recoverable via conflict reconciliation.
    #[error("checkout rejected: {} item(s) already borrowed", conflicts.len())]
    AlreadyBorrowed { conflicts: Vec<ItemCount> },

    /// Any other structured rejection from the API.
    #[error("api error ({reason}): {message}")]
    Api {
        reason: ErrorReason,
        message: String,
    },

    /// Network failure, timeout, or a response body that was not the
    /// expected JSON envelope.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// The reason code for this error, for UI message lookup.
    ///
    /// Client-side failures map onto the closest server-defined codes
    /// so the embedding UI needs only one lookup table.
    pub fn reason(&self) -> ErrorReason {
        match self {
            DeskError::AlreadyBorrowed { .. } => ErrorReason::AlreadyBorrowed,
            DeskError::Api { reason, .. } => *reason,
            DeskError::Validation(_) => ErrorReason::ValidationFailed,
            DeskError::NotFound { .. } => ErrorReason::NoSuchObject,
            _ => ErrorReason::Unknown,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the inventory REST API.
//!
//! Provides [`DeskClient`], which owns the session cookie jar and maps
//! the API's JSON error envelope onto [`stockdesk_core::DeskError`].

pub mod client;
pub mod types;

pub use client::DeskClient;
pub use types::{CheckinRequest, CheckoutRequest, LoginRequest};

// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkout/checkin reconciliation workflow.
//!
//! This crate holds the client-side transaction logic: resolving
//! scanned tokens against in-memory snapshots, maintaining the
//! selection ledgers, submitting checkout/checkin transactions, and
//! remediating `already_borrowed` rejections. Everything is driven by
//! discrete operator input; the only asynchronous operations are the
//! network calls.

pub mod flow;
pub mod ledger;
pub mod reconcile;
pub mod resolver;
pub mod store;

pub use flow::{CheckinFlow, CheckoutFlow, Phase, ScanOutcome};
pub use ledger::{CheckinEntry, CheckinLedger, CheckoutEntry, CheckoutLedger};
pub use reconcile::reconcile;
pub use resolver::{Resolved, checkin_candidate, resolve};
pub use store::InventorySnapshot;

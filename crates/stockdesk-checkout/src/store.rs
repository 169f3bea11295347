// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory snapshot of the server's canonical collections.
//!
//! The snapshot is refreshed wholesale and is read-only to the
//! workflow, except for the borrow-state merge applied after a
//! successful transaction so the local view catches up without a
//! refetch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use stockdesk_api::DeskClient;
use stockdesk_core::{BorrowState, DeskError, Item, User};

/// Snapshot of users, items and borrow states.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub users: Vec<User>,
    pub items: Vec<Item>,
    pub borrowstates: Vec<BorrowState>,
}

impl InventorySnapshot {
    /// Fetch a fresh snapshot of all three collections.
    pub async fn fetch(client: &DeskClient) -> Result<Self, DeskError> {
        let users = client.fetch_users().await?;
        let items = client.fetch_items().await?;
        let borrowstates = client.fetch_borrowstates().await?;
        debug!(
            users = users.len(),
            items = items.len(),
            borrowstates = borrowstates.len(),
            "snapshot loaded"
        );
        Ok(Self {
            users,
            items,
            borrowstates,
        })
    }

    /// Merge borrow states returned by a transaction into the snapshot.
    ///
    /// Ids already present are replaced in place (a checkin closing a
    /// loan), new ids are appended (a fresh checkout).
    pub fn merge_borrowstates(&mut self, new: Vec<BorrowState>) {
        for state in new {
            match self.borrowstates.iter_mut().find(|b| b.id == state.id) {
                Some(existing) => *existing = state,
                None => self.borrowstates.push(state),
            }
        }
    }

    /// Borrow states that are still out.
    pub fn open_borrowstates(&self) -> impl Iterator<Item = &BorrowState> {
        self.borrowstates.iter().filter(|b| b.is_open())
    }
}

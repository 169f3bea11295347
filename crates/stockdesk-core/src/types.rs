// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Stockdesk workspace.
//!
//! These mirror the wire representation of the inventory API: ids are
//! plain integers on the wire, wrapped in newtypes here so a user id
//! can never be passed where an item id is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Unique identifier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub i64);

/// Unique identifier of a borrow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BorrowStateId(pub i64);

/// A registered user. Identity is immutable once created; this client
/// only resolves and displays users, it never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub barcode: String,
}

/// A borrowable item. `quantity_in_stock` bounds how many units are
/// currently available; `quantity_total` bounds a single selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub barcode: String,
    pub quantity_total: u32,
    pub quantity_in_stock: u32,
}

/// Record of an outstanding or closed loan of item units to a user.
///
/// Created by a successful checkout and closed (`returned_at` set) by a
/// successful checkin; never deleted, only transitioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowState {
    pub id: BorrowStateId,
    pub borrowed_item: Item,
    pub borrowing_user: User,
    pub quantity: u32,
    pub received_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowState {
    /// An open borrow state represents units that are still out.
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// An `{id, count}` pair as used by checkout bodies, checkin bodies and
/// conflict payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub id: ItemId,
    pub count: u32,
}

// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity resolution for scanned tokens.
//!
//! A token can be a physical barcode or a typed username/item name.
//! Barcodes are checked before names so a numeric barcode wins over a
//! possibly-colliding human-readable name. Exact matches only.

use stockdesk_core::{BorrowState, BorrowStateId, Item, ItemId, User, UserId};

/// The entity a token resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    User(User),
    Item(Item),
}

/// Resolve a free-text token against in-memory snapshots.
///
/// Precedence: user barcode, item barcode, username, item name. The
/// token is trimmed first. Returns `None` when nothing matches; the
/// caller surfaces the miss and keeps its input so the operator can
/// correct it.
pub fn resolve(token: &str, users: &[User], items: &[Item]) -> Option<Resolved> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(user) = users.iter().find(|u| u.barcode == token) {
        return Some(Resolved::User(user.clone()));
    }
    if let Some(item) = items.iter().find(|i| i.barcode == token) {
        return Some(Resolved::Item(item.clone()));
    }
    if let Some(user) = users.iter().find(|u| u.username == token) {
        return Some(Resolved::User(user.clone()));
    }
    items
        .iter()
        .find(|i| i.name == token)
        .map(|i| Resolved::Item(i.clone()))
}

/// Pick the borrow state a checkin of `item_id` should close next.
///
/// Among open borrow states for the item whose id is not already
/// selected: prefer one attributed to the returning user, then the
/// earliest `received_at` (oldest loan returned first).
pub fn checkin_candidate<'a>(
    item_id: ItemId,
    returning_user: Option<UserId>,
    borrowstates: &'a [BorrowState],
    selected: &[BorrowStateId],
) -> Option<&'a BorrowState> {
    borrowstates
        .iter()
        .filter(|b| b.borrowed_item.id == item_id && b.is_open() && !selected.contains(&b.id))
        .min_by_key(|b| (Some(b.borrowing_user.id) != returning_user, b.received_at))
}

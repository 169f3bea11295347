// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conflict remediation for rejected checkouts.
//!
//! When a checkout is rejected with `already_borrowed`, the server
//! reports how many units of each conflicting item are still
//! available. The remediation is the checkin that frees exactly the
//! missing units, attributed to the session user, after which the
//! operator can resubmit the checkout.

use tracing::warn;

use stockdesk_core::ItemCount;

use crate::ledger::CheckoutLedger;

/// Compute the checkin needed before the rejected checkout can proceed.
///
/// For each conflicting item with a ledger entry, emits `{id, count:
/// selected - available}`. Entries whose selection exceeds the item's
/// total quantity are a data inconsistency: they are skipped and
/// logged instead of producing an invalid count.
pub fn reconcile(conflicts: &[ItemCount], ledger: &CheckoutLedger) -> Vec<ItemCount> {
    let mut specs = Vec::new();
    for conflict in conflicts {
        let Some(entry) = ledger.get(conflict.id) else {
            warn!(item = conflict.id.0, "conflict reported for an unselected item");
            continue;
        };
        if entry.count > entry.item.quantity_total {
            warn!(
                item = conflict.id.0,
                selected = entry.count,
                total = entry.item.quantity_total,
                "selection exceeds item total, skipping"
            );
            continue;
        }
        let missing = entry.count.saturating_sub(conflict.count);
        if missing > 0 {
            specs.push(ItemCount {
                id: conflict.id,
                count: missing,
            });
        }
    }
    specs
}

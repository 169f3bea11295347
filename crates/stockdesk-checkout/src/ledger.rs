// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selection ledgers for pending checkout/checkin transactions.
//!
//! A ledger owns its entries and is the only place they are mutated.
//! Both ledgers keep the most recent selection first and never hold two
//! entries for the same id. Counts clamp silently: incrementing past
//! the cap or decrementing below zero is a no-op, not an error.

use tracing::debug;

use stockdesk_core::{BorrowState, BorrowStateId, Item, ItemCount, ItemId};

/// One pending checkout line: an item and how many units to check out.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutEntry {
    pub item: Item,
    pub count: u32,
    /// Set when the server rejected this item as already borrowed;
    /// cleared after a successful remediation checkin.
    pub conflicted: bool,
}

/// Working set of items being checked out.
#[derive(Debug, Clone, Default)]
pub struct CheckoutLedger {
    entries: Vec<CheckoutEntry>,
}

impl CheckoutLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CheckoutEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, item_id: ItemId) -> Option<&CheckoutEntry> {
        self.entries.iter().find(|e| e.item.id == item_id)
    }

    /// Add an item to the selection, merging with an existing entry.
    ///
    /// A repeated scan of the same item increments its count (capped at
    /// the item's total quantity) instead of growing the list.
    pub fn add_or_increment(&mut self, item: &Item) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.item.id == item.id) {
            if entry.count < entry.item.quantity_total {
                entry.count += 1;
            } else {
                debug!(item = %item.name, cap = item.quantity_total, "selection already at cap");
            }
            return;
        }
        self.entries.insert(
            0,
            CheckoutEntry {
                item: item.clone(),
                count: 1,
                conflicted: false,
            },
        );
    }

    /// Increment an entry's count, capped at the item's total quantity.
    pub fn increment(&mut self, item_id: ItemId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.item.id == item_id) {
            entry.count = entry.count.saturating_add(1).min(entry.item.quantity_total);
        }
    }

    /// Decrement an entry's count, floored at zero. The entry stays in
    /// the ledger so the operator can re-increment it.
    pub fn decrement(&mut self, item_id: ItemId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.item.id == item_id) {
            entry.count = entry.count.saturating_sub(1);
        }
    }

    /// Flag the entries named in a conflict payload.
    pub fn mark_conflicts(&mut self, conflicts: &[ItemCount]) {
        for entry in &mut self.entries {
            if conflicts.iter().any(|c| c.id == entry.item.id) {
                entry.conflicted = true;
            }
        }
    }

    /// Clear all conflict flags, typically after remediation succeeded.
    pub fn clear_conflicts(&mut self) {
        for entry in &mut self.entries {
            entry.conflicted = false;
        }
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries.iter().any(|e| e.conflicted)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The request body lines for this selection. Entries decremented
    /// to zero are kept visible in the ledger but not submitted.
    pub fn item_counts(&self) -> Vec<ItemCount> {
        self.entries
            .iter()
            .filter(|e| e.count > 0)
            .map(|e| ItemCount {
                id: e.item.id,
                count: e.count,
            })
            .collect()
    }
}

/// One pending checkin line: a borrow state and how many units come back.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinEntry {
    pub borrowstate: BorrowState,
    pub count: u32,
}

/// Working set of borrow states being checked in.
///
/// `ceiling` decides whether counts are clamped to the borrow state's
/// quantity; with it off the server is the only validator.
#[derive(Debug, Clone)]
pub struct CheckinLedger {
    entries: Vec<CheckinEntry>,
    ceiling: bool,
}

impl CheckinLedger {
    pub fn new(ceiling: bool) -> Self {
        Self {
            entries: Vec::new(),
            ceiling,
        }
    }

    pub fn entries(&self) -> &[CheckinEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids already selected, for candidate lookups.
    pub fn selected_ids(&self) -> Vec<BorrowStateId> {
        self.entries.iter().map(|e| e.borrowstate.id).collect()
    }

    /// Add a borrow state to the selection; a duplicate is a no-op.
    ///
    /// The count defaults to the full loaned quantity and is adjusted
    /// independently afterwards, so re-adding must not touch it.
    pub fn add_or_skip(&mut self, borrowstate: &BorrowState) {
        if self.entries.iter().any(|e| e.borrowstate.id == borrowstate.id) {
            debug!(borrowstate = borrowstate.id.0, "already selected");
            return;
        }
        self.entries.insert(
            0,
            CheckinEntry {
                borrowstate: borrowstate.clone(),
                count: borrowstate.quantity,
            },
        );
    }

    /// Increment an entry's count. With the ceiling rule on, clamps at
    /// the borrow state's loaned quantity.
    pub fn increment(&mut self, id: BorrowStateId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.borrowstate.id == id) {
            let next = entry.count.saturating_add(1);
            entry.count = if self.ceiling {
                next.min(entry.borrowstate.quantity)
            } else {
                next
            };
        }
    }

    /// Decrement an entry's count, floored at zero.
    pub fn decrement(&mut self, id: BorrowStateId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.borrowstate.id == id) {
            entry.count = entry.count.saturating_sub(1);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The request body lines: per selected loan, the item id and the
    /// number of units coming back. Zero counts are not submitted.
    pub fn item_counts(&self) -> Vec<ItemCount> {
        self.entries
            .iter()
            .filter(|e| e.count > 0)
            .map(|e| ItemCount {
                id: e.borrowstate.borrowed_item.id,
                count: e.count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use stockdesk_core::{User, UserId};

    fn item(id: i64, total: u32) -> Item {
        Item {
            id: ItemId(id),
            name: format!("item-{id}"),
            barcode: format!("I{id}"),
            quantity_total: total,
            quantity_in_stock: total,
        }
    }

    fn borrowstate(id: i64, item_id: i64, quantity: u32) -> BorrowState {
        BorrowState {
            id: BorrowStateId(id),
            borrowed_item: item(item_id, 10),
            borrowing_user: User {
                id: UserId(1),
                username: "alice".into(),
                barcode: "U1".into(),
            },
            quantity,
            received_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            returned_at: None,
        }
    }

    #[test]
    fn repeated_add_merges_and_caps() {
        let mut ledger = CheckoutLedger::new();
        let drill = item(1, 2);
        for _ in 0..5 {
            ledger.add_or_increment(&drill);
        }
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].count, 2);
    }

    #[test]
    fn newest_selection_is_first() {
        let mut ledger = CheckoutLedger::new();
        ledger.add_or_increment(&item(1, 5));
        ledger.add_or_increment(&item(2, 5));
        assert_eq!(ledger.entries()[0].item.id, ItemId(2));
    }

    #[test]
    fn decrement_floors_at_zero_and_keeps_entry() {
        let mut ledger = CheckoutLedger::new();
        ledger.add_or_increment(&item(1, 5));
        ledger.decrement(ItemId(1));
        ledger.decrement(ItemId(1));
        assert_eq!(ledger.entries()[0].count, 0);
        // zero-count entries stay visible but are not submitted
        assert!(ledger.item_counts().is_empty());
        ledger.increment(ItemId(1));
        assert_eq!(ledger.item_counts(), vec![ItemCount { id: ItemId(1), count: 1 }]);
    }

    #[test]
    fn conflict_flags_mark_and_clear() {
        let mut ledger = CheckoutLedger::new();
        ledger.add_or_increment(&item(1, 5));
        ledger.add_or_increment(&item(2, 5));
        ledger.mark_conflicts(&[ItemCount {
            id: ItemId(1),
            count: 0,
        }]);
        assert!(ledger.get(ItemId(1)).unwrap().conflicted);
        assert!(!ledger.get(ItemId(2)).unwrap().conflicted);
        assert!(ledger.has_conflicts());
        ledger.clear_conflicts();
        assert!(!ledger.has_conflicts());
    }

    #[test]
    fn checkin_add_defaults_to_full_quantity_and_skips_duplicates() {
        let mut ledger = CheckinLedger::new(true);
        let bs = borrowstate(1, 1, 3);
        ledger.add_or_skip(&bs);
        ledger.decrement(BorrowStateId(1));
        // re-adding must not reset or increment the adjusted count
        ledger.add_or_skip(&bs);
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].count, 2);
    }

    #[test]
    fn checkin_ceiling_clamps_increment() {
        let mut ledger = CheckinLedger::new(true);
        ledger.add_or_skip(&borrowstate(1, 1, 3));
        for _ in 0..5 {
            ledger.increment(BorrowStateId(1));
        }
        assert_eq!(ledger.entries()[0].count, 3);
    }

    #[test]
    fn checkin_without_ceiling_is_unbounded() {
        let mut ledger = CheckinLedger::new(false);
        ledger.add_or_skip(&borrowstate(1, 1, 3));
        for _ in 0..5 {
            ledger.increment(BorrowStateId(1));
        }
        assert_eq!(ledger.entries()[0].count, 8);
    }

    #[test]
    fn checkin_body_uses_item_ids() {
        let mut ledger = CheckinLedger::new(true);
        ledger.add_or_skip(&borrowstate(1, 7, 2));
        ledger.add_or_skip(&borrowstate(2, 9, 1));
        assert_eq!(
            ledger.item_counts(),
            vec![
                ItemCount {
                    id: ItemId(9),
                    count: 1
                },
                ItemCount {
                    id: ItemId(7),
                    count: 2
                },
            ]
        );
    }

    // Invariants: no duplicate ids and counts within [0, cap] after any
    // sequence of add/increment/decrement operations.

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Inc(usize),
        Dec(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4usize).prop_map(Op::Add),
            (0..4usize).prop_map(Op::Inc),
            (0..4usize).prop_map(Op::Dec),
        ]
    }

    proptest! {
        #[test]
        fn checkout_ledger_invariants(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let pool: Vec<Item> = (0..4).map(|i| item(i, (i as u32 % 3) + 1)).collect();
            let mut ledger = CheckoutLedger::new();
            for op in ops {
                match op {
                    Op::Add(i) => ledger.add_or_increment(&pool[i]),
                    Op::Inc(i) => ledger.increment(pool[i].id),
                    Op::Dec(i) => ledger.decrement(pool[i].id),
                }
            }
            let mut seen = std::collections::HashSet::new();
            for entry in ledger.entries() {
                prop_assert!(seen.insert(entry.item.id), "duplicate entry for {:?}", entry.item.id);
                prop_assert!(entry.count <= entry.item.quantity_total);
            }
        }

        #[test]
        fn fresh_entry_count_is_min_of_n_and_cap(n in 1..20u32, cap in 1..8u32) {
            let the_item = item(1, cap);
            let mut ledger = CheckoutLedger::new();
            for _ in 0..n {
                ledger.add_or_increment(&the_item);
            }
            prop_assert_eq!(ledger.entries()[0].count, n.min(cap));
        }

        #[test]
        fn checkin_ledger_invariants(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let pool: Vec<BorrowState> =
                (0..4).map(|i| borrowstate(i, i, (i as u32 % 3) + 1)).collect();
            let mut ledger = CheckinLedger::new(true);
            for op in ops {
                match op {
                    Op::Add(i) => ledger.add_or_skip(&pool[i]),
                    Op::Inc(i) => ledger.increment(pool[i].id),
                    Op::Dec(i) => ledger.decrement(pool[i].id),
                }
            }
            let mut seen = std::collections::HashSet::new();
            for entry in ledger.entries() {
                prop_assert!(seen.insert(entry.borrowstate.id));
                prop_assert!(entry.count <= entry.borrowstate.quantity);
            }
        }
    }
}

// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkout and checkin transaction flows.
//!
//! A flow ties a selection ledger, the selected user and a phase
//! together and drives one transaction at a time: populate via scans,
//! submit, and (for checkouts) reconcile an `already_borrowed`
//! rejection. Preconditions are checked client-side before any request
//! goes out, and every failure leaves the flow in a state the operator
//! can recover from.

use tracing::info;

use stockdesk_api::DeskClient;
use stockdesk_api::types::{CheckinRequest, CheckoutRequest};
use stockdesk_config::model::CheckoutConfig;
use stockdesk_core::{BorrowState, DeskError, Item, ItemCount, User};

use crate::ledger::{CheckinLedger, CheckoutLedger};
use crate::reconcile::reconcile;
use crate::resolver::{Resolved, checkin_candidate, resolve};
use crate::store::InventorySnapshot;

/// Lifecycle of a transaction.
///
/// `Committed` and a fresh `Empty` are equivalent reset states for the
/// next transaction; `Rejected` keeps the conflict context around so
/// remediation stays available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Populating,
    Submitting,
    Committed,
    Rejected,
    Reconciling,
}

/// What a successful scan did, so the caller knows to clear its input.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The token named a user; it replaced the previous selection.
    UserSelected(User),
    /// The token named an item; the checkout ledger was updated.
    ItemAdded(Item),
    /// The token named an item; this open loan was selected for checkin.
    LoanSelected(BorrowState),
}

/// A pending checkout transaction.
#[derive(Debug)]
pub struct CheckoutFlow {
    ledger: CheckoutLedger,
    selected_user: Option<User>,
    conflicts: Option<Vec<ItemCount>>,
    phase: Phase,
    single_flight: bool,
}

impl CheckoutFlow {
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            ledger: CheckoutLedger::new(),
            selected_user: None,
            conflicts: None,
            phase: Phase::Empty,
            single_flight: config.single_flight,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ledger(&self) -> &CheckoutLedger {
        &self.ledger
    }

    /// Mutable ledger access for count adjustments between scans.
    pub fn ledger_mut(&mut self) -> &mut CheckoutLedger {
        &mut self.ledger
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.selected_user.as_ref()
    }

    /// Drop the whole transaction and start over.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.selected_user = None;
        self.conflicts = None;
        self.phase = Phase::Empty;
    }

    /// Resolve one scanned token and apply it to the transaction.
    ///
    /// A user token replaces the selected user; an item token merges
    /// into the ledger. On a miss the caller keeps its input so the
    /// operator can correct the token.
    pub fn scan(
        &mut self,
        token: &str,
        snapshot: &InventorySnapshot,
    ) -> Result<ScanOutcome, DeskError> {
        match resolve(token, &snapshot.users, &snapshot.items) {
            None => Err(DeskError::NotFound {
                token: token.trim().to_string(),
            }),
            Some(Resolved::User(user)) => {
                self.selected_user = Some(user.clone());
                self.phase = Phase::Populating;
                Ok(ScanOutcome::UserSelected(user))
            }
            Some(Resolved::Item(item)) => {
                self.ledger.add_or_increment(&item);
                self.phase = Phase::Populating;
                Ok(ScanOutcome::ItemAdded(item))
            }
        }
    }

    /// Submit the checkout.
    ///
    /// Preconditions fail fast with no request sent. On success the
    /// ledger is cleared and the returned borrow states are merged into
    /// the snapshot; an `already_borrowed` rejection flags the
    /// conflicting entries and leaves remediation available.
    pub async fn submit(
        &mut self,
        client: &DeskClient,
        snapshot: &mut InventorySnapshot,
    ) -> Result<Vec<BorrowState>, DeskError> {
        if self.phase == Phase::Submitting && self.single_flight {
            return Err(DeskError::Validation(
                "a submission is already in flight".into(),
            ));
        }
        let item_counts = self.ledger.item_counts();
        if item_counts.is_empty() {
            return Err(DeskError::Validation("Select an item to checkout".into()));
        }
        let Some(user) = self.selected_user.clone() else {
            return Err(DeskError::Validation("Select borrowing user".into()));
        };

        let request = CheckoutRequest {
            borrowing_user_id: user.id,
            borrowed_item_ids: item_counts,
        };
        self.phase = Phase::Submitting;
        info!(
            user = %user.username,
            lines = request.borrowed_item_ids.len(),
            "submitting checkout"
        );

        match client.checkout(&request).await {
            Ok(states) => {
                snapshot.merge_borrowstates(states.clone());
                self.ledger.clear();
                self.selected_user = None;
                self.conflicts = None;
                self.phase = Phase::Committed;
                Ok(states)
            }
            Err(DeskError::AlreadyBorrowed { conflicts }) => {
                self.ledger.mark_conflicts(&conflicts);
                self.conflicts = Some(conflicts.clone());
                self.phase = Phase::Rejected;
                Err(DeskError::AlreadyBorrowed { conflicts })
            }
            Err(err) => {
                self.phase = Phase::Populating;
                Err(err)
            }
        }
    }

    /// Check in the missing units of a rejected checkout.
    ///
    /// The remediation checkin is attributed to the session user. On
    /// success conflict flags are cleared and the flow returns to
    /// populating; the checkout itself is NOT resubmitted, the operator
    /// does that explicitly.
    pub async fn reconcile(
        &mut self,
        client: &DeskClient,
        snapshot: &mut InventorySnapshot,
    ) -> Result<Vec<BorrowState>, DeskError> {
        let Some(conflicts) = self.conflicts.clone() else {
            return Err(DeskError::Validation(
                "no rejected checkout to reconcile".into(),
            ));
        };
        let Some(user) = self.selected_user.clone() else {
            return Err(DeskError::Validation("Select borrowing user".into()));
        };

        let specs = reconcile(&conflicts, &self.ledger);
        if specs.is_empty() {
            self.ledger.clear_conflicts();
            self.conflicts = None;
            self.phase = Phase::Populating;
            return Ok(Vec::new());
        }

        self.phase = Phase::Reconciling;
        info!(user = %user.username, lines = specs.len(), "submitting remediation checkin");

        let request = CheckinRequest {
            user_id: user.id,
            item_ids: specs,
        };
        match client.checkin(&request).await {
            Ok(states) => {
                snapshot.merge_borrowstates(states.clone());
                self.ledger.clear_conflicts();
                self.conflicts = None;
                self.phase = Phase::Populating;
                Ok(states)
            }
            Err(err) => {
                self.phase = Phase::Rejected;
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

/// A pending checkin transaction.
#[derive(Debug)]
pub struct CheckinFlow {
    ledger: CheckinLedger,
    selected_user: Option<User>,
    phase: Phase,
    single_flight: bool,
}

impl CheckinFlow {
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            ledger: CheckinLedger::new(config.checkin_ceiling),
            selected_user: None,
            phase: Phase::Empty,
            single_flight: config.single_flight,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ledger(&self) -> &CheckinLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut CheckinLedger {
        &mut self.ledger
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.selected_user.as_ref()
    }

    pub fn reset(&mut self) {
        self.ledger.clear();
        self.selected_user = None;
        self.phase = Phase::Empty;
    }

    /// Resolve one scanned token and apply it to the transaction.
    ///
    /// An item token selects the next open loan of that item to close:
    /// loans of the returning user first, then the oldest.
    pub fn scan(
        &mut self,
        token: &str,
        snapshot: &InventorySnapshot,
    ) -> Result<ScanOutcome, DeskError> {
        match resolve(token, &snapshot.users, &snapshot.items) {
            None => Err(DeskError::NotFound {
                token: token.trim().to_string(),
            }),
            Some(Resolved::User(user)) => {
                self.selected_user = Some(user.clone());
                self.phase = Phase::Populating;
                Ok(ScanOutcome::UserSelected(user))
            }
            Some(Resolved::Item(item)) => {
                let selected = self.ledger.selected_ids();
                let candidate = checkin_candidate(
                    item.id,
                    self.selected_user.as_ref().map(|u| u.id),
                    &snapshot.borrowstates,
                    &selected,
                )
                .ok_or_else(|| {
                    DeskError::Validation(format!("no open loan for `{}`", item.name))
                })?
                .clone();
                self.ledger.add_or_skip(&candidate);
                self.phase = Phase::Populating;
                Ok(ScanOutcome::LoanSelected(candidate))
            }
        }
    }

    /// Submit the checkin. On success the ledger is cleared and the
    /// closed borrow states are merged into the snapshot.
    pub async fn submit(
        &mut self,
        client: &DeskClient,
        snapshot: &mut InventorySnapshot,
    ) -> Result<Vec<BorrowState>, DeskError> {
        if self.phase == Phase::Submitting && self.single_flight {
            return Err(DeskError::Validation(
                "a submission is already in flight".into(),
            ));
        }
        let item_counts = self.ledger.item_counts();
        if item_counts.is_empty() {
            return Err(DeskError::Validation("Select at least one item".into()));
        }
        let Some(user) = self.selected_user.clone() else {
            return Err(DeskError::Validation("Select returning user".into()));
        };

        let request = CheckinRequest {
            user_id: user.id,
            item_ids: item_counts,
        };
        self.phase = Phase::Submitting;
        info!(
            user = %user.username,
            lines = request.item_ids.len(),
            "submitting checkin"
        );

        match client.checkin(&request).await {
            Ok(states) => {
                snapshot.merge_borrowstates(states.clone());
                self.ledger.clear();
                self.selected_user = None;
                self.phase = Phase::Committed;
                Ok(states)
            }
            Err(err) => {
                self.phase = Phase::Populating;
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockdesk_config::model::ServerConfig;
    use stockdesk_core::{BorrowStateId, ItemId, UserId};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> CheckoutConfig {
        CheckoutConfig::default()
    }

    fn client(base_url: &str) -> DeskClient {
        DeskClient::new(&ServerConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn user(id: i64, username: &str, barcode: &str) -> User {
        User {
            id: UserId(id),
            username: username.to_string(),
            barcode: barcode.to_string(),
        }
    }

    fn item(id: i64, name: &str, barcode: &str, total: u32) -> Item {
        Item {
            id: ItemId(id),
            name: name.to_string(),
            barcode: barcode.to_string(),
            quantity_total: total,
            quantity_in_stock: total,
        }
    }

    fn borrowstate(id: i64, the_item: &Item, the_user: &User, day: u32) -> BorrowState {
        BorrowState {
            id: BorrowStateId(id),
            borrowed_item: the_item.clone(),
            borrowing_user: the_user.clone(),
            quantity: 2,
            received_at: Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap(),
            returned_at: None,
        }
    }

    fn snapshot() -> InventorySnapshot {
        InventorySnapshot {
            users: vec![user(1, "alice", "U1"), user(2, "bob", "U2")],
            items: vec![item(7, "drill", "I7", 5), item(9, "ladder", "I9", 2)],
            borrowstates: Vec::new(),
        }
    }

    fn borrowstate_json(id: i64, item_id: i64, quantity: u32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "borrowed_item": {
                "id": item_id,
                "name": "drill",
                "barcode": "I7",
                "quantity_total": 5,
                "quantity_in_stock": 3
            },
            "borrowing_user": {"id": 1, "username": "alice", "barcode": "U1"},
            "quantity": quantity,
            "received_at": "2026-03-01T10:00:00Z",
            "returned_at": null
        })
    }

    #[tokio::test]
    async fn empty_selection_sends_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut flow = CheckoutFlow::new(&config());
        let mut snap = snapshot();
        let err = flow.submit(&client(&server.uri()), &mut snap).await.unwrap_err();
        assert_eq!(err.to_string(), "Select an item to checkout");
    }

    #[tokio::test]
    async fn missing_user_sends_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut flow = CheckoutFlow::new(&config());
        let mut snap = snapshot();
        flow.scan("I7", &snap).unwrap();
        let err = flow.submit(&client(&server.uri()), &mut snap).await.unwrap_err();
        assert_eq!(err.to_string(), "Select borrowing user");
    }

    #[tokio::test]
    async fn checkout_posts_ledger_contents_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkout"))
            .and(body_json(serde_json::json!({
                "borrowing_user_id": 1,
                "borrowed_item_ids": [{"id": 7, "count": 2}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "borrowstates": [borrowstate_json(100, 7, 2)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut flow = CheckoutFlow::new(&config());
        let mut snap = snapshot();
        flow.scan("I7", &snap).unwrap();
        flow.scan("I7", &snap).unwrap();
        flow.scan("U1", &snap).unwrap();

        let states = flow.submit(&client(&server.uri()), &mut snap).await.unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(flow.phase(), Phase::Committed);
        assert!(flow.ledger().is_empty());
        assert!(flow.selected_user().is_none());
        assert_eq!(snap.borrowstates.len(), 1);
        assert_eq!(snap.borrowstates[0].id, BorrowStateId(100));
    }

    #[tokio::test]
    async fn scan_miss_leaves_transaction_untouched() {
        let mut flow = CheckoutFlow::new(&config());
        let snap = snapshot();
        let err = flow.scan("no-such-token", &snap).unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
        assert!(flow.ledger().is_empty());
        assert_eq!(flow.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn scanning_second_user_replaces_first() {
        let mut flow = CheckoutFlow::new(&config());
        let snap = snapshot();
        flow.scan("U1", &snap).unwrap();
        flow.scan("bob", &snap).unwrap();
        assert_eq!(flow.selected_user().unwrap().username, "bob");
    }

    #[tokio::test]
    async fn conflict_flags_entries_and_reconcile_frees_missing_units() {
        let server = MockServer::start().await;
        // selection of 5, total 5, server reports 2 available
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkout"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "reason": "already_borrowed",
                "message": "Item is already borrowed.",
                "items": [{"id": 7, "count": 2}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkin"))
            .and(body_json(serde_json::json!({
                "user_id": 1,
                "item_ids": [{"id": 7, "count": 3}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "borrowstates": [borrowstate_json(55, 7, 3)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut flow = CheckoutFlow::new(&config());
        let mut snap = snapshot();
        for _ in 0..5 {
            flow.scan("I7", &snap).unwrap();
        }
        flow.scan("U1", &snap).unwrap();

        let api = client(&server.uri());
        let err = flow.submit(&api, &mut snap).await.unwrap_err();
        assert!(matches!(err, DeskError::AlreadyBorrowed { .. }));
        assert_eq!(flow.phase(), Phase::Rejected);
        assert!(flow.ledger().get(ItemId(7)).unwrap().conflicted);
        // the selection survives the rejection
        assert_eq!(flow.ledger().get(ItemId(7)).unwrap().count, 5);

        let states = flow.reconcile(&api, &mut snap).await.unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(flow.phase(), Phase::Populating);
        assert!(!flow.ledger().has_conflicts());
        // checkout is not resubmitted automatically: the checkout mock
        // still counts exactly one call.
    }

    #[tokio::test]
    async fn single_flight_rejects_overlapping_submit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut flow = CheckoutFlow::new(&config());
        let mut snap = snapshot();
        flow.scan("I7", &snap).unwrap();
        flow.scan("U1", &snap).unwrap();
        flow.set_phase(Phase::Submitting);

        let err = flow.submit(&client(&server.uri()), &mut snap).await.unwrap_err();
        assert!(err.to_string().contains("already in flight"));
    }

    #[tokio::test]
    async fn transport_failure_returns_to_populating() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let mut flow = CheckoutFlow::new(&config());
        let mut snap = snapshot();
        flow.scan("I7", &snap).unwrap();
        flow.scan("U1", &snap).unwrap();

        let err = flow.submit(&client(&server.uri()), &mut snap).await.unwrap_err();
        assert!(matches!(err, DeskError::Transport { .. }));
        assert_eq!(flow.phase(), Phase::Populating);
        // selection kept for an explicit retry
        assert!(!flow.ledger().is_empty());
    }

    #[tokio::test]
    async fn checkin_scan_prefers_returning_users_loan() {
        let mut snap = snapshot();
        let drill = snap.items[0].clone();
        let alice = snap.users[0].clone();
        let bob = snap.users[1].clone();
        snap.borrowstates = vec![
            borrowstate(1, &drill, &bob, 1),
            borrowstate(2, &drill, &alice, 15),
        ];

        let mut flow = CheckinFlow::new(&config());
        flow.scan("alice", &snap).unwrap();
        let outcome = flow.scan("I7", &snap).unwrap();
        match outcome {
            ScanOutcome::LoanSelected(bs) => assert_eq!(bs.id, BorrowStateId(2)),
            other => panic!("expected LoanSelected, got {other:?}"),
        }
        // the next scan of the same item picks the remaining loan
        flow.scan("I7", &snap).unwrap();
        assert_eq!(flow.ledger().entries().len(), 2);
    }

    #[tokio::test]
    async fn checkin_scan_with_no_open_loan_fails() {
        let mut flow = CheckinFlow::new(&config());
        let snap = snapshot();
        let err = flow.scan("I9", &snap).unwrap_err();
        assert!(err.to_string().contains("no open loan"));
    }

    #[tokio::test]
    async fn checkin_submits_selected_loans() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkin"))
            .and(body_json(serde_json::json!({
                "user_id": 2,
                "item_ids": [{"id": 7, "count": 2}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "borrowstates": [{
                    "id": 1,
                    "borrowed_item": {
                        "id": 7, "name": "drill", "barcode": "I7",
                        "quantity_total": 5, "quantity_in_stock": 5
                    },
                    "borrowing_user": {"id": 2, "username": "bob", "barcode": "U2"},
                    "quantity": 2,
                    "received_at": "2026-03-01T10:00:00Z",
                    "returned_at": "2026-03-05T16:00:00Z"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut snap = snapshot();
        let drill = snap.items[0].clone();
        let bob = snap.users[1].clone();
        snap.borrowstates = vec![borrowstate(1, &drill, &bob, 1)];

        let mut flow = CheckinFlow::new(&config());
        flow.scan("U2", &snap).unwrap();
        flow.scan("I7", &snap).unwrap();

        let states = flow.submit(&client(&server.uri()), &mut snap).await.unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(flow.phase(), Phase::Committed);
        assert!(flow.ledger().is_empty());
        // the closed loan replaced the open one in place
        assert_eq!(snap.borrowstates.len(), 1);
        assert!(!snap.borrowstates[0].is_open());
    }

    #[tokio::test]
    async fn checkin_preconditions_fail_fast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/borrowstates/checkin"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = client(&server.uri());
        let mut snap = snapshot();
        let drill = snap.items[0].clone();
        let bob = snap.users[1].clone();
        snap.borrowstates = vec![borrowstate(1, &drill, &bob, 1)];

        let mut flow = CheckinFlow::new(&config());
        let err = flow.submit(&api, &mut snap).await.unwrap_err();
        assert_eq!(err.to_string(), "Select at least one item");

        flow.scan("I7", &snap).unwrap();
        let err = flow.submit(&api, &mut snap).await.unwrap_err();
        assert_eq!(err.to_string(), "Select returning user");
    }
}

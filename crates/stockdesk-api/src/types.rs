// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response types for the inventory REST API.

use serde::{Deserialize, Serialize};

use stockdesk_core::{BorrowState, ErrorReason, Item, ItemCount, User, UserId};

/// Body of `POST /api/v1/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/v1/borrowstates/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub borrowing_user_id: UserId,
    pub borrowed_item_ids: Vec<ItemCount>,
}

/// Body of `POST /api/v1/borrowstates/checkin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRequest {
    pub user_id: UserId,
    pub item_ids: Vec<ItemCount>,
}

/// Response envelope of the snapshot and transaction endpoints.
#[derive(Debug, Deserialize)]
pub struct BorrowStatesResponse {
    pub borrowstates: Vec<BorrowState>,
}

#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// Error body returned by the API on non-2xx responses.
///
/// `items` is only present on `already_borrowed` rejections and carries
/// the per-item counts still available.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub reason: ErrorReason,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub items: Option<Vec<ItemCount>>,
}

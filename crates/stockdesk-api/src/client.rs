// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the inventory API.
//!
//! Provides [`DeskClient`] which handles request construction, the
//! session cookie, and translation of the JSON error envelope into
//! [`DeskError`] values. There is no retry policy: a failed call
//! surfaces immediately and the operator decides what to do.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use stockdesk_config::model::ServerConfig;
use stockdesk_core::{BorrowState, DeskError, ErrorReason, Item, User};

use crate::types::{
    ApiErrorBody, BorrowStatesResponse, CheckinRequest, CheckoutRequest, ItemsResponse,
    LoginRequest, UsersResponse,
};

/// HTTP client for inventory API communication.
///
/// Owns the cookie jar that carries the session established by
/// [`DeskClient::login`]. Cloning is cheap and shares the jar.
#[derive(Debug, Clone)]
pub struct DeskClient {
    client: reqwest::Client,
    base_url: String,
}

impl DeskClient {
    /// Creates a new API client from server settings.
    ///
    /// The configured timeout bounds every request, including a submit
    /// that would otherwise sit in flight forever.
    pub fn new(config: &ServerConfig) -> Result<Self, DeskError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeskError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// Authenticates and establishes the session cookie.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), DeskError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/login"))
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        debug!(status = %status, username, "login response received");

        if status.is_success() {
            return Ok(());
        }
        Err(error_from_response(status, &read_body(response).await?))
    }

    /// Ends the session on the server and drops the cookie's validity.
    pub async fn logout(&self) -> Result<(), DeskError> {
        let response = self
            .client
            .post(self.url("/logout"))
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        debug!(status = %status, "logout response received");

        if status.is_success() {
            return Ok(());
        }
        Err(error_from_response(status, &read_body(response).await?))
    }

    /// Fetches the full user snapshot.
    pub async fn fetch_users(&self) -> Result<Vec<User>, DeskError> {
        let response: UsersResponse = self.get("/users").await?;
        Ok(response.users)
    }

    /// Fetches the full item snapshot.
    pub async fn fetch_items(&self) -> Result<Vec<Item>, DeskError> {
        let response: ItemsResponse = self.get("/items").await?;
        Ok(response.items)
    }

    /// Fetches all borrow states, open and returned.
    pub async fn fetch_borrowstates(&self) -> Result<Vec<BorrowState>, DeskError> {
        let response: BorrowStatesResponse = self.get("/borrowstates").await?;
        Ok(response.borrowstates)
    }

    /// Submits a checkout transaction.
    ///
    /// An `already_borrowed` rejection surfaces as
    /// [`DeskError::AlreadyBorrowed`] carrying the conflict payload so
    /// the caller can reconcile.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<Vec<BorrowState>, DeskError> {
        let response: BorrowStatesResponse = self.post("/borrowstates/checkout", request).await?;
        Ok(response.borrowstates)
    }

    /// Submits a checkin transaction.
    pub async fn checkin(&self, request: &CheckinRequest) -> Result<Vec<BorrowState>, DeskError> {
        let response: BorrowStatesResponse = self.post("/borrowstates/checkin", request).await?;
        Ok(response.borrowstates)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DeskError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(send_error)?;
        let status = response.status();
        debug!(status = %status, path, "response received");
        decode(status, &read_body(response).await?)
    }

    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeskError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(send_error)?;
        let status = response.status();
        debug!(status = %status, path, "response received");
        decode(status, &read_body(response).await?)
    }
}

fn send_error(e: reqwest::Error) -> DeskError {
    DeskError::Transport {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, DeskError> {
    response.text().await.map_err(|e| DeskError::Transport {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, DeskError> {
    if status.is_success() {
        serde_json::from_str(body).map_err(|e| DeskError::Transport {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    } else {
        Err(error_from_response(status, body))
    }
}

/// Translate a non-2xx response into the error taxonomy.
///
/// Structured `{reason, message, items?}` bodies keep their reason code;
/// anything else (HTML error pages, truncated bodies) is a transport
/// error and gets logged for diagnosis.
fn error_from_response(status: StatusCode, body: &str) -> DeskError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) if err.reason == ErrorReason::AlreadyBorrowed => DeskError::AlreadyBorrowed {
            conflicts: err.items.unwrap_or_default(),
        },
        Ok(err) => DeskError::Api {
            reason: err.reason,
            message: err.message,
        },
        Err(_) => {
            warn!(status = %status, body = %body, "unparseable error response");
            DeskError::Transport {
                message: format!("API returned {status}: {body}"),
                source: None,
            }
        }
    }
}

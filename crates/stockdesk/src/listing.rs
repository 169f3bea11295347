// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot listing commands.

use colored::Colorize;

use stockdesk_api::DeskClient;
use stockdesk_core::DeskError;

pub async fn items(client: &DeskClient) -> Result<(), DeskError> {
    let items = client.fetch_items().await?;
    println!(
        "{}",
        format!(
            "{:<6} {:<28} {:<16} {:>6} {:>9}",
            "id", "name", "barcode", "total", "in stock"
        )
        .bold()
    );
    for item in items {
        println!(
            "{:<6} {:<28} {:<16} {:>6} {:>9}",
            item.id.0, item.name, item.barcode, item.quantity_total, item.quantity_in_stock
        );
    }
    Ok(())
}

pub async fn users(client: &DeskClient) -> Result<(), DeskError> {
    let users = client.fetch_users().await?;
    println!(
        "{}",
        format!("{:<6} {:<24} {:<16}", "id", "username", "barcode").bold()
    );
    for user in users {
        println!("{:<6} {:<24} {:<16}", user.id.0, user.username, user.barcode);
    }
    Ok(())
}

/// List borrow states; open loans only unless `all` is set.
pub async fn borrowstates(client: &DeskClient, all: bool) -> Result<(), DeskError> {
    let states = client.fetch_borrowstates().await?;
    println!(
        "{}",
        format!(
            "{:<6} {:<24} {:>5} {:<16} {:<20} {:<20}",
            "id", "item", "qty", "borrowed by", "received at", "returned at"
        )
        .bold()
    );
    for state in states.iter().filter(|s| all || s.is_open()) {
        let returned = state
            .returned_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<24} {:>5} {:<16} {:<20} {:<20}",
            state.id.0,
            state.borrowed_item.name,
            state.quantity,
            state.borrowing_user.username,
            state.received_at.format("%Y-%m-%d %H:%M"),
            returned
        );
    }
    Ok(())
}

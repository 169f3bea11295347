// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive desk loops for checkout and checkin transactions.
//!
//! Each line the operator enters is a scanned token (barcode, username
//! or item name); lines starting with `:` are commands. The loop keeps
//! running through recoverable errors so a mistyped scan never costs
//! the pending selection.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use stockdesk_api::DeskClient;
use stockdesk_checkout::{CheckinFlow, CheckoutFlow, InventorySnapshot, Resolved, ScanOutcome};
use stockdesk_config::DeskConfig;
use stockdesk_core::{DeskError, Item, ItemCount};

const CHECKOUT_HELP: &str = "\
  <token>        scan an item or the borrowing user
  :+ <item>      one more unit of an already-selected item
  :- <item>      one unit less
  :list          show the pending selection
  :submit        check the selection out
  :reconcile     check in missing units after a rejection
  :clear         drop the selection
  :quit          leave";

const CHECKIN_HELP: &str = "\
  <token>        scan an item or the returning user
  :+ <item>      one more unit of a selected loan
  :- <item>      one unit less
  :list          show the pending selection
  :submit        check the selection in
  :clear         drop the selection
  :quit          leave";

/// Run an interactive checkout transaction until the operator leaves.
pub async fn run_checkout(client: &DeskClient, config: &DeskConfig) -> Result<(), DeskError> {
    let mut snapshot = InventorySnapshot::fetch(client).await?;
    let mut flow = CheckoutFlow::new(&config.checkout);
    let mut rl = editor()?;

    println!(
        "{}",
        "scan items and the borrowing user; :submit to check out, :help for commands".dimmed()
    );

    loop {
        let Some(line) = read_line(&mut rl, "checkout> ")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            match command.split_once(' ').unwrap_or((command, "")) {
                ("q" | "quit", _) => break,
                ("help", _) => println!("{CHECKOUT_HELP}"),
                ("list", _) => print_checkout_selection(&flow),
                ("clear", _) => {
                    flow.reset();
                    println!("selection cleared");
                }
                ("+", token) => {
                    if let Some(item) = resolve_item(token, &snapshot) {
                        flow.ledger_mut().increment(item.id);
                        print_checkout_selection(&flow);
                    }
                }
                ("-", token) => {
                    if let Some(item) = resolve_item(token, &snapshot) {
                        flow.ledger_mut().decrement(item.id);
                        print_checkout_selection(&flow);
                    }
                }
                ("submit", _) => match flow.submit(client, &mut snapshot).await {
                    Ok(states) => {
                        println!("{} {} loan(s) created", "checked out:".green().bold(), states.len());
                    }
                    Err(DeskError::AlreadyBorrowed { conflicts }) => {
                        print_conflicts(&conflicts, &snapshot);
                    }
                    Err(err) => eprintln!("{} {err}", "error:".red().bold()),
                },
                ("reconcile", _) => match flow.reconcile(client, &mut snapshot).await {
                    Ok(states) => {
                        println!(
                            "{} {} loan(s) updated; :submit to retry the checkout",
                            "checked in:".green().bold(),
                            states.len()
                        );
                    }
                    Err(err) => eprintln!("{} {err}", "error:".red().bold()),
                },
                _ => println!("unknown command, :help lists them"),
            }
            continue;
        }

        match flow.scan(line, &snapshot) {
            Ok(ScanOutcome::UserSelected(user)) => {
                println!("borrowing user: {}", user.username.bold());
            }
            Ok(ScanOutcome::ItemAdded(item)) => {
                let count = flow.ledger().get(item.id).map(|e| e.count).unwrap_or(0);
                println!("{:>3}x {}", count, item.name.bold());
            }
            // a checkout scan never selects loans
            Ok(ScanOutcome::LoanSelected(_)) => {}
            Err(err) => eprintln!("{} {err}", "error:".red().bold()),
        }
    }
    Ok(())
}

/// Run an interactive checkin transaction until the operator leaves.
pub async fn run_checkin(client: &DeskClient, config: &DeskConfig) -> Result<(), DeskError> {
    let mut snapshot = InventorySnapshot::fetch(client).await?;
    let mut flow = CheckinFlow::new(&config.checkout);
    let mut rl = editor()?;

    println!(
        "{}",
        "scan returned items and the returning user; :submit to check in, :help for commands"
            .dimmed()
    );

    loop {
        let Some(line) = read_line(&mut rl, "checkin> ")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            match command.split_once(' ').unwrap_or((command, "")) {
                ("q" | "quit", _) => break,
                ("help", _) => println!("{CHECKIN_HELP}"),
                ("list", _) => print_checkin_selection(&flow),
                ("clear", _) => {
                    flow.reset();
                    println!("selection cleared");
                }
                ("+", token) => {
                    if let Some(id) = selected_loan_id(token, &snapshot, &flow) {
                        flow.ledger_mut().increment(id);
                        print_checkin_selection(&flow);
                    }
                }
                ("-", token) => {
                    if let Some(id) = selected_loan_id(token, &snapshot, &flow) {
                        flow.ledger_mut().decrement(id);
                        print_checkin_selection(&flow);
                    }
                }
                ("submit", _) => match flow.submit(client, &mut snapshot).await {
                    Ok(states) => {
                        println!("{} {} loan(s) closed", "checked in:".green().bold(), states.len());
                    }
                    Err(err) => eprintln!("{} {err}", "error:".red().bold()),
                },
                _ => println!("unknown command, :help lists them"),
            }
            continue;
        }

        match flow.scan(line, &snapshot) {
            Ok(ScanOutcome::UserSelected(user)) => {
                println!("returning user: {}", user.username.bold());
            }
            Ok(ScanOutcome::LoanSelected(state)) => {
                println!(
                    "loan #{}: {:>3}x {} (borrowed by {})",
                    state.id.0,
                    state.quantity,
                    state.borrowed_item.name.bold(),
                    state.borrowing_user.username
                );
            }
            // a checkin scan never adds checkout items
            Ok(ScanOutcome::ItemAdded(_)) => {}
            Err(err) => eprintln!("{} {err}", "error:".red().bold()),
        }
    }
    Ok(())
}

fn editor() -> Result<DefaultEditor, DeskError> {
    DefaultEditor::new().map_err(|e| DeskError::Internal(format!("terminal setup failed: {e}")))
}

/// Read one line; `None` means the operator is done (Ctrl-C/Ctrl-D).
fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>, DeskError> {
    match rl.readline(prompt) {
        Ok(line) => {
            let _ = rl.add_history_entry(line.as_str());
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(DeskError::Internal(format!("readline failed: {e}"))),
    }
}

/// Resolve a token to an item for count adjustments.
fn resolve_item(token: &str, snapshot: &InventorySnapshot) -> Option<Item> {
    match stockdesk_checkout::resolve(token, &snapshot.users, &snapshot.items) {
        Some(Resolved::Item(item)) => Some(item),
        Some(Resolved::User(user)) => {
            println!("`{}` is a user, not an item", user.username);
            None
        }
        None => {
            println!("nothing matches `{}`", token.trim());
            None
        }
    }
}

/// Find the selected loan a count adjustment refers to, by item token.
fn selected_loan_id(
    token: &str,
    snapshot: &InventorySnapshot,
    flow: &CheckinFlow,
) -> Option<stockdesk_core::BorrowStateId> {
    let item = resolve_item(token, snapshot)?;
    let entry = flow
        .ledger()
        .entries()
        .iter()
        .find(|e| e.borrowstate.borrowed_item.id == item.id);
    match entry {
        Some(entry) => Some(entry.borrowstate.id),
        None => {
            println!("`{}` is not in the selection", item.name);
            None
        }
    }
}

fn print_checkout_selection(flow: &CheckoutFlow) {
    match flow.selected_user() {
        Some(user) => println!("borrowing user: {}", user.username.bold()),
        None => println!("{}", "no borrowing user selected".dimmed()),
    }
    if flow.ledger().is_empty() {
        println!("{}", "no items selected".dimmed());
        return;
    }
    for entry in flow.ledger().entries() {
        let conflict = if entry.conflicted {
            "  already borrowed".red().to_string()
        } else {
            String::new()
        };
        println!(
            "{:>3}x {} [{}]{}",
            entry.count, entry.item.name, entry.item.barcode, conflict
        );
    }
}

fn print_checkin_selection(flow: &CheckinFlow) {
    match flow.selected_user() {
        Some(user) => println!("returning user: {}", user.username.bold()),
        None => println!("{}", "no returning user selected".dimmed()),
    }
    if flow.ledger().is_empty() {
        println!("{}", "no loans selected".dimmed());
        return;
    }
    for entry in flow.ledger().entries() {
        println!(
            "{:>3}x {} (loan #{}, borrowed by {})",
            entry.count,
            entry.borrowstate.borrowed_item.name,
            entry.borrowstate.id.0,
            entry.borrowstate.borrowing_user.username
        );
    }
}

fn print_conflicts(conflicts: &[ItemCount], snapshot: &InventorySnapshot) {
    eprintln!("{}", "checkout rejected, items already borrowed:".red().bold());
    for conflict in conflicts {
        let name = snapshot
            .items
            .iter()
            .find(|i| i.id == conflict.id)
            .map(|i| i.name.as_str())
            .unwrap_or("unknown item");
        eprintln!("  {} ({} available)", name, conflict.count);
    }
    eprintln!("run :reconcile to check in the missing units, then :submit again");
}

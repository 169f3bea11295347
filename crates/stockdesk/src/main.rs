// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stockdesk - an interactive checkout desk for inventory management.
//!
//! This is the binary entry point. It loads and validates
//! configuration, establishes the API session, and dispatches to the
//! desk loops and snapshot listings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use stockdesk_api::DeskClient;
use stockdesk_config::DeskConfig;
use stockdesk_core::DeskError;

mod desk;
mod listing;

/// Stockdesk - an interactive checkout desk for inventory management.
#[derive(Parser, Debug)]
#[command(name = "stockdesk", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (skips the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Authenticate as this user before running the command.
    #[arg(long, global = true, value_name = "USERNAME")]
    login: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify credentials against the server.
    Login {
        /// Username to log in as.
        username: String,
    },
    /// Run an interactive checkout transaction.
    Checkout,
    /// Run an interactive checkin transaction.
    Checkin,
    /// List all items.
    Items,
    /// List all users.
    Users,
    /// List borrow states.
    Borrowstates {
        /// Include returned loans, not just open ones.
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => stockdesk_config::load_and_validate_path(path),
        None => stockdesk_config::load_and_validate(),
    };
    let config = match config {
        Ok(config) => config,
        Err(errors) => {
            stockdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.client.log_level);

    if let Err(err) = run(cli, config).await {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: DeskConfig) -> Result<(), DeskError> {
    let client = DeskClient::new(&config.server)?;

    if let Some(username) = &cli.login {
        authenticate(&client, username).await?;
    }

    match cli.command {
        Commands::Login { username } => {
            authenticate(&client, &username).await?;
            println!("logged in as {}", username.bold());
        }
        Commands::Checkout => desk::run_checkout(&client, &config).await?,
        Commands::Checkin => desk::run_checkin(&client, &config).await?,
        Commands::Items => listing::items(&client).await?,
        Commands::Users => listing::users(&client).await?,
        Commands::Borrowstates { all } => listing::borrowstates(&client, all).await?,
    }
    Ok(())
}

/// Prompt for a password and establish the session cookie.
async fn authenticate(client: &DeskClient, username: &str) -> Result<(), DeskError> {
    let password = rpassword::prompt_password(format!("password for {username}: "))
        .map_err(|e| DeskError::Internal(format!("failed to read password: {e}")))?;
    client.login(username, &password).await
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stockdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = stockdesk_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.server.base_url, "http://localhost:5000");
    }
}

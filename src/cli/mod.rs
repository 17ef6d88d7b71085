//! CLI module for Prodboard
//!
//! Provides commands:
//! - `migrate`: create or upgrade the database schema
//! - `user`: create, inspect and update users
//! - `item`: add and delete workspace items
//! - `workspace`: print a workspace projection

use crate::settings::AppConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prodboard_store::{LocalId, UserId, WorkspaceId, WorkspaceRepository, WorkspaceStore};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub mod item;
pub mod user;
pub mod workspace;

/// Prodboard workspace store CLI
#[derive(Parser, Debug)]
#[command(name = "prodboard")]
#[command(about = "Users, workspaces and board items on SQLite")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and schema
    Migrate,
    /// Manage users
    #[command(subcommand)]
    User(UserCommands),
    /// Manage workspace items
    #[command(subcommand)]
    Item(ItemCommands),
    /// Inspect workspaces
    #[command(subcommand)]
    Workspace(WorkspaceCommands),
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user together with its workspace
    Create {
        login: String,
        #[arg(long)]
        password: String,
    },
    /// Show a user
    Show { id: UserId },
    /// List users
    List {
        /// 1-based page
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Print the number of users
    Count,
    /// Change login and/or password
    Update {
        id: UserId,
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Check a login/password pair
    Login {
        login: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Create an item from a JSON payload
    Add {
        workspace: WorkspaceId,
        /// Inline JSON payload
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        json: Option<String>,
        /// Read the JSON payload from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete an item and everything it owns
    Delete {
        workspace: WorkspaceId,
        item: LocalId,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommands {
    /// Print all items of a workspace
    Show { id: WorkspaceId },
}

/// Run the CLI command
pub async fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let store = open_store(config).await?;
    let repo: &dyn WorkspaceRepository = &store;
    let result = match command {
        Commands::Migrate => {
            info!(path = %config.database.path.display(), "Database ready");
            print_json(&serde_json::json!({ "database": config.database.path }))
        }
        Commands::User(cmd) => user::run(repo, &config.auth.secret, cmd).await,
        Commands::Item(cmd) => item::run(repo, cmd).await,
        Commands::Workspace(cmd) => workspace::run(repo, cmd).await,
    };
    store.close().await;
    result
}

async fn open_store(config: &AppConfig) -> Result<WorkspaceStore> {
    WorkspaceStore::from_path(&config.database.path, &config.database.store_config())
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database.path.display()
            )
        })
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Pretty-print a value as JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

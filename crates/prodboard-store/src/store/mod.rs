//! WorkspaceStore: SQLite persistence for users, workspaces and items.
//!
//! Every operation runs in its own transaction. A dropped transaction rolls
//! back, so an aborted or cancelled mutation leaves nothing behind.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::WorkspaceId;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

mod items;
mod loader;
mod migrations;
mod users;


/// SQLite-backed workspace store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct WorkspaceStore {
    pub(crate) pool: SqlitePool,
    pub(crate) max_sequence_retries: u32,
}

impl WorkspaceStore {
    /// Open (or create) a store at the given path.
    pub async fn from_path(db_path: &Path, config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("cannot create database directory: {e}")))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout())
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            max_sequence_retries: config.max_sequence_retries.max(1),
        };
        store.run_migrations().await?;
        info!(path = %db_path.display(), "Workspace store initialized");
        Ok(store)
    }

    /// In-memory store (for tests).
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self {
            pool,
            max_sequence_retries: StoreConfig::default().max_sequence_retries,
        };
        store.run_migrations().await?;
        debug!("In-memory workspace store initialized");
        Ok(store)
    }

    /// Check database health.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// True if the workspace row exists.
pub(crate) async fn workspace_row_exists(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM workspaces WHERE user_id = ?1")
        .bind(workspace_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

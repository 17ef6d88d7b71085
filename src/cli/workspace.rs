//! Workspace CLI commands

use super::{print_json, WorkspaceCommands};
use anyhow::Result;
use prodboard_store::WorkspaceRepository;

/// Run a workspace subcommand.
pub async fn run(repo: &dyn WorkspaceRepository, cmd: WorkspaceCommands) -> Result<()> {
    match cmd {
        WorkspaceCommands::Show { id } => print_json(&repo.load_workspace(id).await?),
    }
}

//! Item CLI commands
//!
//! `prodboard item add <workspace> --json '{"text":{"content":"hi"}}'`
//! `prodboard item delete <workspace> <item>`

use super::{print_json, ItemCommands};
use anyhow::{Context, Result};
use prodboard_store::{ItemCreate, WorkspaceRepository};
use std::path::Path;

/// Run an item subcommand.
pub async fn run(repo: &dyn WorkspaceRepository, cmd: ItemCommands) -> Result<()> {
    match cmd {
        ItemCommands::Add {
            workspace,
            json,
            file,
        } => {
            let payload = match (json, file) {
                (Some(json), _) => json,
                (None, Some(path)) => read_payload(&path)?,
                (None, None) => anyhow::bail!("either --json or --file is required"),
            };
            let request = parse_request(&payload)?;
            let id = repo.create_item(workspace, &request).await?;
            print_json(&serde_json::json!({ "workspace_id": workspace, "id": id }))
        }
        ItemCommands::Delete { workspace, item } => {
            repo.delete_item(workspace, item).await?;
            print_json(&serde_json::json!({ "workspace_id": workspace, "deleted": item }))
        }
    }
}

fn read_payload(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload from {}", path.display()))
}

fn parse_request(payload: &str) -> Result<ItemCreate> {
    serde_json::from_str(payload).context("Invalid item payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_defaults() {
        let req = parse_request(r#"{"shape": {"name": "circle"}, "position_x": 4}"#).unwrap();
        assert_eq!(req.position_x, 4.0);
        assert_eq!(req.shape.unwrap().name, "circle");
        assert!(req.text.is_none());
    }

    #[test]
    fn test_parse_request_rejects_garbage() {
        assert!(parse_request("not json").is_err());
    }
}

use super::WorkspaceStore;
use crate::error::{Error, Result};
use crate::request::ItemCreate;
use crate::resolver::{resolve, ResolvedItem, ResolvedVariant};
use crate::sequencer::{conflict_or_database, next_id, Scope};
use crate::types::{ItemKind, LocalId, WorkspaceId};
use sqlx::SqliteConnection;
use std::time::Duration;
use tracing::{debug, warn};

/// Base delay between item ID retries; doubles per attempt.
const RETRY_BASE_DELAY_MS: u64 = 5;

impl WorkspaceStore {
    // ── Create ──────────────────────────────────────────────────

    /// Create an item in a workspace and return its workspace-scoped ID.
    ///
    /// Runs in one transaction: lock the workspace (or fail with
    /// [`Error::NotFound`]), resolve the variant, assign the next local ID,
    /// then insert the item, its variant record and any owned children.
    /// ID collisions are retried with a fresh ID up to the configured limit
    /// and then reported as [`Error::Storage`].
    pub async fn create_item(
        &self,
        workspace_id: WorkspaceId,
        request: &ItemCreate,
    ) -> Result<LocalId> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create_item(workspace_id, request).await {
                Err(Error::SequenceConflict { scope }) if attempt < self.max_sequence_retries => {
                    warn!(workspace_id, attempt, %scope, "Item id conflict, retrying");
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
                Err(Error::SequenceConflict { scope }) => {
                    return Err(Error::Storage(format!(
                        "could not assign an item id in {scope} after {attempt} attempts"
                    )));
                }
                other => return other,
            }
        }
    }

    async fn try_create_item(
        &self,
        workspace_id: WorkspaceId,
        request: &ItemCreate,
    ) -> Result<LocalId> {
        let scope = Scope::Workspace(workspace_id);
        let mut tx = self.pool.begin().await?;

        let locked = lock_workspace(&mut *tx, workspace_id)
            .await
            .map_err(|e| conflict_or_database(e, scope))?;
        if !locked {
            return Err(Error::not_found("workspace not found"));
        }

        let item = resolve(request)?;
        let local_id = next_id(&mut *tx, scope).await?;

        insert_item_row(&mut *tx, workspace_id, local_id, &item).await?;
        insert_variant(&mut *tx, workspace_id, local_id, &item.variant).await?;

        tx.commit()
            .await
            .map_err(|e| conflict_or_database(e, scope))?;

        debug!(workspace_id, local_id, kind = %item.variant.kind(), "Item created");
        Ok(local_id)
    }

    // ── Delete ──────────────────────────────────────────────────

    /// Delete an item together with its variant record and owned children.
    ///
    /// [`Error::NotFound`] if the workspace is missing or holds no item with
    /// this ID; nothing is changed in that case.
    pub async fn delete_item(&self, workspace_id: WorkspaceId, local_id: LocalId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if !lock_workspace(&mut *tx, workspace_id).await? {
            return Err(Error::not_found("workspace not found"));
        }

        let kind: Option<(String,)> =
            sqlx::query_as("SELECT kind FROM items WHERE local_id = ?1 AND workspace_id = ?2")
                .bind(local_id)
                .bind(workspace_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((kind,)) = kind else {
            return Err(Error::not_found("item not found in workspace"));
        };
        let kind = ItemKind::parse(&kind).ok_or_else(|| {
            Error::Internal(format!(
                "item {local_id} in workspace {workspace_id} has unknown kind '{kind}'"
            ))
        })?;

        delete_variant(&mut *tx, workspace_id, local_id, kind).await?;

        let result = sqlx::query("DELETE FROM items WHERE local_id = ?1 AND workspace_id = ?2")
            .bind(local_id)
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("item not found in workspace"));
        }

        tx.commit().await?;
        debug!(workspace_id, local_id, %kind, "Item deleted");
        Ok(())
    }
}

fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS << attempt.min(6))
}

/// Bump the workspace revision. Being the first write of the transaction,
/// this takes the SQLite write lock before any ID is computed. Returns
/// false if the workspace does not exist.
async fn lock_workspace(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE workspaces SET revision = revision + 1 WHERE user_id = ?1")
        .bind(workspace_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

async fn insert_item_row(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
    local_id: LocalId,
    item: &ResolvedItem,
) -> Result<()> {
    let attrs = &item.attributes;
    sqlx::query(
        "INSERT INTO items
         (local_id, workspace_id, kind, position_x, position_y, z_index, width, height, color, scale)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(local_id)
    .bind(workspace_id)
    .bind(item.variant.kind().as_str())
    .bind(attrs.position_x)
    .bind(attrs.position_y)
    .bind(attrs.z_index)
    .bind(attrs.width)
    .bind(attrs.height)
    .bind(&attrs.color)
    .bind(attrs.scale)
    .execute(&mut *conn)
    .await
    .map_err(|e| conflict_or_database(e, Scope::Workspace(workspace_id)))?;
    Ok(())
}

async fn insert_single(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    workspace_id: WorkspaceId,
    local_id: LocalId,
    value: &str,
) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO {table} (item_id, workspace_id, {column}) VALUES (?1, ?2, ?3)"
    ))
    .bind(local_id)
    .bind(workspace_id)
    .bind(value)
    .execute(&mut *conn)
    .await
    .map_err(|e| conflict_or_database(e, Scope::Workspace(workspace_id)))?;
    Ok(())
}

async fn insert_variant(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
    local_id: LocalId,
    variant: &ResolvedVariant,
) -> Result<()> {
    let item_scope = Scope::Workspace(workspace_id);
    match variant {
        ResolvedVariant::Text(t) => {
            insert_single(conn, "text_items", "content", workspace_id, local_id, &t.content).await
        }
        ResolvedVariant::Image(i) => {
            insert_single(conn, "image_items", "bytes", workspace_id, local_id, &i.bytes).await
        }
        ResolvedVariant::Shape(s) => {
            insert_single(conn, "shape_items", "name", workspace_id, local_id, &s.name).await
        }
        ResolvedVariant::TodoList(fields) => {
            sqlx::query("INSERT INTO todo_list_items (item_id, workspace_id) VALUES (?1, ?2)")
                .bind(local_id)
                .bind(workspace_id)
                .execute(&mut *conn)
                .await
                .map_err(|e| conflict_or_database(e, item_scope))?;

            let field_scope = Scope::TodoList {
                workspace_id,
                todo_list_id: local_id,
            };
            for field in fields {
                let field_id = next_id(conn, field_scope).await?;
                sqlx::query(
                    "INSERT INTO todo_list_fields (field_id, todo_list_item_id, workspace_id, done)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(field_id)
                .bind(local_id)
                .bind(workspace_id)
                .bind(field.done)
                .execute(&mut *conn)
                .await
                .map_err(|e| conflict_or_database(e, field_scope))?;

                sqlx::query(
                    "INSERT INTO todo_field_texts (field_id, todo_list_item_id, workspace_id, content)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(field_id)
                .bind(local_id)
                .bind(workspace_id)
                .bind(&field.text.content)
                .execute(&mut *conn)
                .await
                .map_err(|e| conflict_or_database(e, field_scope))?;
            }
            Ok(())
        }
        ResolvedVariant::Drawing(d) => {
            sqlx::query("INSERT INTO drawing_items (item_id, workspace_id) VALUES (?1, ?2)")
                .bind(local_id)
                .bind(workspace_id)
                .execute(&mut *conn)
                .await
                .map_err(|e| conflict_or_database(e, item_scope))?;

            for p in &d.points {
                sqlx::query(
                    "INSERT INTO points (drawing_item_id, workspace_id, x, y) VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(local_id)
                .bind(workspace_id)
                .bind(p.x)
                .bind(p.y)
                .execute(&mut *conn)
                .await?;
            }
            Ok(())
        }
    }
}

/// Remove the owned subtree of an item, children first.
async fn delete_variant(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
    local_id: LocalId,
    kind: ItemKind,
) -> Result<()> {
    let statements: &[&str] = match kind {
        ItemKind::Text => &["DELETE FROM text_items WHERE item_id = ?1 AND workspace_id = ?2"],
        ItemKind::Image => &["DELETE FROM image_items WHERE item_id = ?1 AND workspace_id = ?2"],
        ItemKind::Shape => &["DELETE FROM shape_items WHERE item_id = ?1 AND workspace_id = ?2"],
        ItemKind::TodoList => &[
            "DELETE FROM todo_field_texts WHERE todo_list_item_id = ?1 AND workspace_id = ?2",
            "DELETE FROM todo_list_fields WHERE todo_list_item_id = ?1 AND workspace_id = ?2",
            "DELETE FROM todo_list_items WHERE item_id = ?1 AND workspace_id = ?2",
        ],
        ItemKind::Drawing => &[
            "DELETE FROM points WHERE drawing_item_id = ?1 AND workspace_id = ?2",
            "DELETE FROM drawing_items WHERE item_id = ?1 AND workspace_id = ?2",
        ],
    };

    for sql in statements {
        sqlx::query(sql)
            .bind(local_id)
            .bind(workspace_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

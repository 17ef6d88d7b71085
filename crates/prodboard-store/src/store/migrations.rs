use super::WorkspaceStore;
use crate::error::Result;

impl WorkspaceStore {
    // ── Migrations ──────────────────────────────────────────────

    /// Create the schema. Idempotent; runs in one transaction.
    ///
    /// Variant tables share the item's `(item_id, workspace_id)` key. Child
    /// rows reference their parent's full composite key without `ON DELETE
    /// CASCADE`: deletion walks the ownership tree explicitly.
    pub(crate) async fn run_migrations(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                login         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at    TEXT NOT NULL
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS workspaces (
                user_id  INTEGER PRIMARY KEY REFERENCES users(id),
                revision INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS items (
                local_id     INTEGER NOT NULL,
                workspace_id INTEGER NOT NULL REFERENCES workspaces(user_id),
                kind         TEXT NOT NULL,
                position_x   REAL NOT NULL,
                position_y   REAL NOT NULL,
                z_index      INTEGER NOT NULL,
                width        REAL NOT NULL,
                height       REAL NOT NULL,
                color        TEXT NOT NULL DEFAULT '#FFFFFF',
                scale        REAL NOT NULL DEFAULT 1.0,
                PRIMARY KEY (local_id, workspace_id)
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_workspace ON items(workspace_id)")
            .execute(&mut *tx)
            .await?;

        // ── Single-row variants ──────────────────────────────────
        for (table, column) in [
            ("text_items", "content"),
            ("image_items", "bytes"),
            ("shape_items", "name"),
        ] {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    item_id      INTEGER NOT NULL,
                    workspace_id INTEGER NOT NULL,
                    {column}     TEXT NOT NULL,
                    PRIMARY KEY (item_id, workspace_id),
                    FOREIGN KEY (item_id, workspace_id) REFERENCES items(local_id, workspace_id)
                )"
            ))
            .execute(&mut *tx)
            .await?;
        }

        // ── Todo lists ───────────────────────────────────────────
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo_list_items (
                item_id      INTEGER NOT NULL,
                workspace_id INTEGER NOT NULL,
                PRIMARY KEY (item_id, workspace_id),
                FOREIGN KEY (item_id, workspace_id) REFERENCES items(local_id, workspace_id)
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo_list_fields (
                field_id          INTEGER NOT NULL,
                todo_list_item_id INTEGER NOT NULL,
                workspace_id      INTEGER NOT NULL,
                done              INTEGER NOT NULL,
                PRIMARY KEY (field_id, todo_list_item_id, workspace_id),
                FOREIGN KEY (todo_list_item_id, workspace_id)
                    REFERENCES todo_list_items(item_id, workspace_id)
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo_field_texts (
                field_id          INTEGER NOT NULL,
                todo_list_item_id INTEGER NOT NULL,
                workspace_id      INTEGER NOT NULL,
                content           TEXT NOT NULL,
                PRIMARY KEY (field_id, todo_list_item_id, workspace_id),
                FOREIGN KEY (field_id, todo_list_item_id, workspace_id)
                    REFERENCES todo_list_fields(field_id, todo_list_item_id, workspace_id)
            )",
        )
        .execute(&mut *tx)
        .await?;

        // ── Drawings ─────────────────────────────────────────────
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS drawing_items (
                item_id      INTEGER NOT NULL,
                workspace_id INTEGER NOT NULL,
                PRIMARY KEY (item_id, workspace_id),
                FOREIGN KEY (item_id, workspace_id) REFERENCES items(local_id, workspace_id)
            )",
        )
        .execute(&mut *tx)
        .await?;

        // Row id is a private join key; insertion order is stroke order.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS points (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                drawing_item_id INTEGER NOT NULL,
                workspace_id    INTEGER NOT NULL,
                x               REAL NOT NULL,
                y               REAL NOT NULL,
                FOREIGN KEY (drawing_item_id, workspace_id)
                    REFERENCES drawing_items(item_id, workspace_id)
            )",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_points_drawing
             ON points(workspace_id, drawing_item_id)",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

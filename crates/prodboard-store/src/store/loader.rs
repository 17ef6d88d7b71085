use super::WorkspaceStore;
use crate::error::{Error, Result};
use crate::projection::WorkspaceRead;
use crate::types::{
    DrawingItem, ImageItem, Item, ItemAttributes, ItemContent, ItemKind, LocalId, Point,
    ShapeItem, TextItem, TodoListField, TodoListItem, Workspace, WorkspaceId,
};
use sqlx::{FromRow, SqliteConnection};
use std::collections::HashMap;
use tracing::debug;

#[derive(FromRow)]
struct ItemRow {
    local_id: LocalId,
    kind: String,
    position_x: f64,
    position_y: f64,
    z_index: u32,
    width: f64,
    height: f64,
    color: String,
    scale: f64,
}

#[derive(FromRow)]
struct SingleRow {
    item_id: LocalId,
    value: String,
}

#[derive(FromRow)]
struct FieldRow {
    field_id: LocalId,
    todo_list_item_id: LocalId,
    done: bool,
    content: String,
}

#[derive(FromRow)]
struct PointRow {
    drawing_item_id: LocalId,
    x: f64,
    y: f64,
}

/// Variant records of one workspace, keyed by owning item.
#[derive(Default)]
struct VariantRecords {
    texts: HashMap<LocalId, String>,
    images: HashMap<LocalId, String>,
    shapes: HashMap<LocalId, String>,
    todo_lists: HashMap<LocalId, Vec<TodoListField>>,
    drawings: HashMap<LocalId, Vec<Point>>,
}

impl VariantRecords {
    /// Take the record of `kind` for item `id`.
    fn take(&mut self, id: LocalId, kind: ItemKind) -> Option<ItemContent> {
        match kind {
            ItemKind::Text => self
                .texts
                .remove(&id)
                .map(|content| ItemContent::Text(TextItem { content })),
            ItemKind::Image => self
                .images
                .remove(&id)
                .map(|bytes| ItemContent::Image(ImageItem { bytes })),
            ItemKind::Shape => self
                .shapes
                .remove(&id)
                .map(|name| ItemContent::Shape(ShapeItem { name })),
            ItemKind::TodoList => self
                .todo_lists
                .remove(&id)
                .map(|fields| ItemContent::TodoList(TodoListItem { fields })),
            ItemKind::Drawing => self
                .drawings
                .remove(&id)
                .map(|points| ItemContent::Drawing(DrawingItem { points })),
        }
    }

    /// Kinds that still hold a record for item `id`.
    fn leftover_kinds(&self, id: LocalId) -> Vec<ItemKind> {
        let mut kinds = Vec::new();
        if self.texts.contains_key(&id) {
            kinds.push(ItemKind::Text);
        }
        if self.images.contains_key(&id) {
            kinds.push(ItemKind::Image);
        }
        if self.todo_lists.contains_key(&id) {
            kinds.push(ItemKind::TodoList);
        }
        if self.shapes.contains_key(&id) {
            kinds.push(ItemKind::Shape);
        }
        if self.drawings.contains_key(&id) {
            kinds.push(ItemKind::Drawing);
        }
        kinds
    }
}

impl WorkspaceStore {
    // ── Load ────────────────────────────────────────────────────

    /// Load the flattened projection of a workspace.
    pub async fn load_workspace(&self, workspace_id: WorkspaceId) -> Result<WorkspaceRead> {
        let workspace = self.workspace_graph(workspace_id).await?;
        Ok(WorkspaceRead::from(&workspace))
    }

    /// Load a workspace with every item, variant record, todo field and
    /// drawing point, read from a single snapshot.
    ///
    /// Fails with [`Error::Internal`] if an item does not have exactly one
    /// variant record matching its kind.
    pub async fn workspace_graph(&self, workspace_id: WorkspaceId) -> Result<Workspace> {
        let mut tx = self.pool.begin().await?;

        let (revision,): (i64,) =
            sqlx::query_as("SELECT revision FROM workspaces WHERE user_id = ?1")
                .bind(workspace_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| Error::not_found("workspace not found"))?;

        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT local_id, kind, position_x, position_y, z_index, width, height, color, scale
             FROM items WHERE workspace_id = ?1 ORDER BY local_id",
        )
        .bind(workspace_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut records = load_variant_records(&mut *tx, workspace_id).await?;
        tx.commit().await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let kind = ItemKind::parse(&row.kind).ok_or_else(|| {
                Error::Internal(format!(
                    "item {} in workspace {workspace_id} has unknown kind '{}'",
                    row.local_id, row.kind
                ))
            })?;
            let content = records.take(row.local_id, kind).ok_or_else(|| {
                Error::Internal(format!(
                    "item {} in workspace {workspace_id} has no {kind} record",
                    row.local_id
                ))
            })?;
            let extra = records.leftover_kinds(row.local_id);
            if !extra.is_empty() {
                return Err(Error::Internal(format!(
                    "item {} in workspace {workspace_id} has {kind} and {extra:?} records",
                    row.local_id
                )));
            }

            items.push(Item {
                local_id: row.local_id,
                workspace_id,
                attributes: ItemAttributes {
                    position_x: row.position_x,
                    position_y: row.position_y,
                    z_index: row.z_index,
                    width: row.width,
                    height: row.height,
                    color: row.color,
                    scale: row.scale,
                },
                content,
            });
        }

        debug!(workspace_id, items = items.len(), "Workspace loaded");
        Ok(Workspace {
            user_id: workspace_id,
            revision,
            items,
        })
    }
}

async fn load_single(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    workspace_id: WorkspaceId,
) -> Result<HashMap<LocalId, String>> {
    let rows: Vec<SingleRow> = sqlx::query_as(&format!(
        "SELECT item_id, {column} AS value FROM {table} WHERE workspace_id = ?1"
    ))
    .bind(workspace_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(|r| (r.item_id, r.value)).collect())
}

async fn load_variant_records(
    conn: &mut SqliteConnection,
    workspace_id: WorkspaceId,
) -> Result<VariantRecords> {
    let mut records = VariantRecords {
        texts: load_single(conn, "text_items", "content", workspace_id).await?,
        images: load_single(conn, "image_items", "bytes", workspace_id).await?,
        shapes: load_single(conn, "shape_items", "name", workspace_id).await?,
        ..VariantRecords::default()
    };

    let lists: Vec<(LocalId,)> =
        sqlx::query_as("SELECT item_id FROM todo_list_items WHERE workspace_id = ?1")
            .bind(workspace_id)
            .fetch_all(&mut *conn)
            .await?;
    for (id,) in lists {
        records.todo_lists.insert(id, Vec::new());
    }

    // A field without its text row is skipped, as if it were never written.
    let fields: Vec<FieldRow> = sqlx::query_as(
        "SELECT f.field_id, f.todo_list_item_id, f.done, t.content
         FROM todo_list_fields f
         JOIN todo_field_texts t
           ON t.field_id = f.field_id
          AND t.todo_list_item_id = f.todo_list_item_id
          AND t.workspace_id = f.workspace_id
         WHERE f.workspace_id = ?1
         ORDER BY f.todo_list_item_id, f.field_id",
    )
    .bind(workspace_id)
    .fetch_all(&mut *conn)
    .await?;
    for f in fields {
        if let Some(list) = records.todo_lists.get_mut(&f.todo_list_item_id) {
            list.push(TodoListField {
                local_id: f.field_id,
                done: f.done,
                text: TextItem { content: f.content },
            });
        }
    }

    let drawings: Vec<(LocalId,)> =
        sqlx::query_as("SELECT item_id FROM drawing_items WHERE workspace_id = ?1")
            .bind(workspace_id)
            .fetch_all(&mut *conn)
            .await?;
    for (id,) in drawings {
        records.drawings.insert(id, Vec::new());
    }

    let points: Vec<PointRow> = sqlx::query_as(
        "SELECT drawing_item_id, x, y FROM points WHERE workspace_id = ?1 ORDER BY id",
    )
    .bind(workspace_id)
    .fetch_all(&mut *conn)
    .await?;
    for p in points {
        if let Some(stroke) = records.drawings.get_mut(&p.drawing_item_id) {
            stroke.push(Point { x: p.x, y: p.y });
        }
    }

    Ok(records)
}

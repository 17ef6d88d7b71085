//! Flattened read projection of a workspace.
//!
//! Each [`ItemRead`] carries the item's scalars plus exactly one populated
//! variant field. Internal join keys (point row IDs, todo field IDs) are not
//! part of the projection.

use crate::types::{Item, ItemContent, LocalId, Workspace, WorkspaceId};
use serde::{Deserialize, Serialize};

/// Workspace as returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRead {
    /// Items ordered by local ID
    pub items: Vec<ItemRead>,
}

/// One item in flattened form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRead {
    /// Workspace-scoped ID
    pub id: LocalId,
    /// Horizontal position
    pub position_x: f64,
    /// Vertical position
    pub position_y: f64,
    /// Stacking index
    pub z_index: u32,
    /// Owning workspace
    pub workspace_id: WorkspaceId,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Color
    pub color: String,
    /// Scale factor
    pub scale: f64,
    /// Text payload, if this is a text item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextItemRead>,
    /// Image payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageItemRead>,
    /// Checklist entries in field order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_list: Option<Vec<TodoListItemFieldRead>>,
    /// Shape payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeItemRead>,
    /// Stroke points in drawing order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing: Option<DrawingItemRead>,
}

/// Text body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItemRead {
    /// Text content
    pub content: String,
}

/// Encoded image data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItemRead {
    /// Encoded image bytes
    pub bytes: String,
}

/// Named shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeItemRead {
    /// Shape name
    pub name: String,
}

/// Checklist entry as `{"text": {"content": ..}, "done": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListItemFieldRead {
    /// Entry text
    pub text: TextItemRead,
    /// Whether the entry is checked
    pub done: bool,
}

/// Freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingItemRead {
    /// Points in stroke order
    pub points: Vec<DrawingPointRead>,
}

/// One stroke point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingPointRead {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl ItemRead {
    /// Number of populated variant fields. Always 1 for projections built
    /// from a stored [`Item`].
    pub fn populated_variants(&self) -> usize {
        [
            self.text.is_some(),
            self.image.is_some(),
            self.todo_list.is_some(),
            self.shape.is_some(),
            self.drawing.is_some(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count()
    }
}

impl From<&Item> for ItemRead {
    fn from(item: &Item) -> Self {
        let attrs = &item.attributes;
        let mut read = ItemRead {
            id: item.local_id,
            position_x: attrs.position_x,
            position_y: attrs.position_y,
            z_index: attrs.z_index,
            workspace_id: item.workspace_id,
            width: attrs.width,
            height: attrs.height,
            color: attrs.color.clone(),
            scale: attrs.scale,
            text: None,
            image: None,
            todo_list: None,
            shape: None,
            drawing: None,
        };

        match &item.content {
            ItemContent::Text(t) => {
                read.text = Some(TextItemRead {
                    content: t.content.clone(),
                });
            }
            ItemContent::Image(i) => {
                read.image = Some(ImageItemRead {
                    bytes: i.bytes.clone(),
                });
            }
            ItemContent::TodoList(list) => {
                read.todo_list = Some(
                    list.fields
                        .iter()
                        .map(|f| TodoListItemFieldRead {
                            text: TextItemRead {
                                content: f.text.content.clone(),
                            },
                            done: f.done,
                        })
                        .collect(),
                );
            }
            ItemContent::Shape(s) => {
                read.shape = Some(ShapeItemRead {
                    name: s.name.clone(),
                });
            }
            ItemContent::Drawing(d) => {
                read.drawing = Some(DrawingItemRead {
                    points: d
                        .points
                        .iter()
                        .map(|p| DrawingPointRead { x: p.x, y: p.y })
                        .collect(),
                });
            }
        }
        read
    }
}

impl From<&Workspace> for WorkspaceRead {
    fn from(ws: &Workspace) -> Self {
        Self {
            items: ws.items.iter().map(ItemRead::from).collect(),
        }
    }
}

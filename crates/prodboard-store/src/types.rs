//! Core data types for the workspace item store.
//!
//! A **workspace** belongs to exactly one user and shares the user's id. It
//! owns **items**, each addressed by a workspace-scoped `local_id` and
//! holding exactly one [`ItemContent`] variant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identifier (SQLite rowid).
pub type UserId = i64;

/// Workspace identifier. A workspace is keyed by its owner's [`UserId`].
pub type WorkspaceId = UserId;

/// Identifier unique only within its scope (a workspace, or a todo list).
pub type LocalId = u32;

/// Default item color when the caller leaves it out.
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Default item scale factor when the caller leaves it out.
pub const DEFAULT_SCALE: f64 = 1.0;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID, also the ID of the user's workspace
    pub id: UserId,
    /// Unique login
    pub login: String,
    /// Credential hash; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the user (and workspace) was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Workspace owned by this user.
    pub fn workspace_id(&self) -> WorkspaceId {
        self.id
    }
}

/// A loaded workspace with its full item graph.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Owning user (and workspace) ID
    pub user_id: UserId,
    /// Number of mutations applied to this workspace
    pub revision: i64,
    /// Items ordered by local ID
    pub items: Vec<Item>,
}

/// A positioned canvas element.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Workspace-scoped ID
    pub local_id: LocalId,
    /// Owning workspace
    pub workspace_id: WorkspaceId,
    /// Position, size and styling
    pub attributes: ItemAttributes,
    /// The single variant this item holds
    pub content: ItemContent,
}

impl Item {
    /// Variant kind of this item.
    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }
}

/// Scalar attributes shared by every item variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAttributes {
    /// Horizontal position
    pub position_x: f64,
    /// Vertical position
    pub position_y: f64,
    /// Stacking index
    pub z_index: u32,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// CSS-style color
    pub color: String,
    /// Scale factor
    pub scale: f64,
}

impl Default for ItemAttributes {
    fn default() -> Self {
        Self {
            position_x: 0.0,
            position_y: 0.0,
            z_index: 0,
            width: 0.0,
            height: 0.0,
            color: DEFAULT_COLOR.to_string(),
            scale: DEFAULT_SCALE,
        }
    }
}

/// The variant payload of an item. Exactly one per item by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemContent {
    /// Text note
    Text(TextItem),
    /// Encoded image
    Image(ImageItem),
    /// Checklist
    TodoList(TodoListItem),
    /// Named shape
    Shape(ShapeItem),
    /// Freehand stroke
    Drawing(DrawingItem),
}

impl ItemContent {
    /// Variant kind tag.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Text(_) => ItemKind::Text,
            Self::Image(_) => ItemKind::Image,
            Self::TodoList(_) => ItemKind::TodoList,
            Self::Shape(_) => ItemKind::Shape,
            Self::Drawing(_) => ItemKind::Drawing,
        }
    }
}

/// Discriminant of [`ItemContent`], persisted alongside the item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Text note
    Text,
    /// Encoded image
    Image,
    /// Checklist
    TodoList,
    /// Named shape
    Shape,
    /// Freehand stroke
    Drawing,
}

impl ItemKind {
    /// All kinds, in declaration order.
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Text,
        ItemKind::Image,
        ItemKind::TodoList,
        ItemKind::Shape,
        ItemKind::Drawing,
    ];

    /// Stable storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::TodoList => "todo_list",
            Self::Shape => "shape",
            Self::Drawing => "drawing",
        }
    }

    /// Parse a storage name. Unknown names are rejected rather than guessed.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    /// The text
    pub content: String,
}

/// Opaque encoded image payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    /// Encoded bytes, stored as given
    pub bytes: String,
}

/// Named shape (`"circle"`, `"rect"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeItem {
    /// Shape name
    pub name: String,
}

/// Checklist owning its fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoListItem {
    /// Fields ordered by their list-scoped ID
    pub fields: Vec<TodoListField>,
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoListField {
    /// ID scoped to the owning todo list
    pub local_id: LocalId,
    /// Completion flag
    pub done: bool,
    /// Entry text
    pub text: TextItem,
}

/// Freehand drawing as an ordered polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawingItem {
    /// Points in stroke order
    pub points: Vec<Point>,
}

/// A drawing point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

//! Flattened creation payloads as they arrive from callers.
//!
//! An [`ItemCreate`] may carry any combination of variant members; the
//! [`resolver`](crate::resolver) decides whether it describes a valid item.

use serde::{Deserialize, Serialize};

/// Item creation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCreate {
    /// Horizontal position
    #[serde(default)]
    pub position_x: f64,
    /// Vertical position
    #[serde(default)]
    pub position_y: f64,
    /// Stacking index
    #[serde(default)]
    pub z_index: u32,
    /// Width
    #[serde(default)]
    pub width: f64,
    /// Height
    #[serde(default)]
    pub height: f64,
    /// Color; empty or missing means white
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Scale; zero or missing means 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Text variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextItemCreate>,
    /// Image variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageItemCreate>,
    /// Todo list variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_list: Option<Vec<TodoItemFieldCreate>>,
    /// Shape variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeItemCreate>,
    /// Drawing variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing: Option<DrawingItemCreate>,
}

/// Text variant payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextItemCreate {
    /// Text content
    pub content: String,
}

/// Image variant payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageItemCreate {
    /// Encoded image
    pub bytes: String,
}

/// Shape variant payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeItemCreate {
    /// Shape name
    pub name: String,
}

/// One todo entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoItemFieldCreate {
    /// Entry text
    pub content: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
}

/// Drawing variant payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawingItemCreate {
    /// Points in stroke order
    pub points: Vec<PointCreate>,
}

/// A drawing point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PointCreate {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl ItemCreate {
    /// Text item at the origin.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(TextItemCreate {
                content: content.into(),
            }),
            ..Self::default()
        }
    }

    /// Image item at the origin.
    pub fn image(bytes: impl Into<String>) -> Self {
        Self {
            image: Some(ImageItemCreate {
                bytes: bytes.into(),
            }),
            ..Self::default()
        }
    }

    /// Shape item at the origin.
    pub fn shape(name: impl Into<String>) -> Self {
        Self {
            shape: Some(ShapeItemCreate { name: name.into() }),
            ..Self::default()
        }
    }

    /// Todo list from `(content, done)` pairs.
    pub fn todo_list<S: Into<String>>(fields: impl IntoIterator<Item = (S, bool)>) -> Self {
        Self {
            todo_list: Some(
                fields
                    .into_iter()
                    .map(|(content, done)| TodoItemFieldCreate {
                        content: content.into(),
                        done,
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Drawing from `(x, y)` pairs.
    pub fn drawing(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            drawing: Some(DrawingItemCreate {
                points: points
                    .into_iter()
                    .map(|(x, y)| PointCreate { x, y })
                    .collect(),
            }),
            ..Self::default()
        }
    }

    /// Set the position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position_x = x;
        self.position_y = y;
        self
    }

    /// Number of variant members present.
    pub fn variant_count(&self) -> usize {
        [
            self.text.is_some(),
            self.image.is_some(),
            self.todo_list.is_some(),
            self.shape.is_some(),
            self.drawing.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_payload() {
        let json = r#"{
            "position_x": 1.5,
            "position_y": 2.0,
            "z_index": 3,
            "todo_list": [
                {"content": "t1", "done": false},
                {"content": "t2", "done": true}
            ]
        }"#;
        let req: ItemCreate = serde_json::from_str(json).unwrap();
        assert_eq!(req.z_index, 3);
        assert_eq!(req.variant_count(), 1);
        let fields = req.todo_list.unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields[1].done);
        assert!(req.color.is_none());
    }

    #[test]
    fn test_variant_count() {
        assert_eq!(ItemCreate::default().variant_count(), 0);
        assert_eq!(ItemCreate::text("a").variant_count(), 1);
        let mut both = ItemCreate::text("a");
        both.image = Some(ImageItemCreate { bytes: "b".into() });
        assert_eq!(both.variant_count(), 2);
    }

    #[test]
    fn test_empty_todo_list_counts_as_variant() {
        let req = ItemCreate::todo_list(Vec::<(String, bool)>::new());
        assert_eq!(req.variant_count(), 1);
    }
}

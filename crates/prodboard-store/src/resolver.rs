//! Variant resolution: turns a flattened [`ItemCreate`] into a typed item.
//!
//! Pure and side-effect free. Todo field IDs are not assigned here; the
//! store hands them out from the [`sequencer`](crate::sequencer) at insert
//! time, one per field, in input order.

use crate::error::{Error, Result};
use crate::request::ItemCreate;
use crate::types::{
    DrawingItem, ImageItem, ItemAttributes, ItemKind, Point, ShapeItem, TextItem, DEFAULT_COLOR,
    DEFAULT_SCALE,
};

/// Validated item awaiting persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    /// Scalar attributes with defaults applied
    pub attributes: ItemAttributes,
    /// The single variant
    pub variant: ResolvedVariant,
}

/// Variant record before IDs are assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedVariant {
    /// Text note
    Text(TextItem),
    /// Encoded image
    Image(ImageItem),
    /// Checklist entries in input order
    TodoList(Vec<TodoFieldDraft>),
    /// Named shape
    Shape(ShapeItem),
    /// Freehand stroke
    Drawing(DrawingItem),
}

/// Checklist entry without its list-scoped ID.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoFieldDraft {
    /// Completion flag
    pub done: bool,
    /// Entry text
    pub text: TextItem,
}

impl ResolvedVariant {
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

/// Validate a creation request and build its variant record.
///
/// Fails with [`Error::Validation`] unless exactly one variant member is
/// present, or when a text item is empty.
pub fn resolve(request: &ItemCreate) -> Result<ResolvedItem> {
    let count = request.variant_count();
    if count != 1 {
        return Err(Error::validation(format!(
            "exactly one item type required (text, image, todo_list, shape or drawing), got {count}"
        )));
    }

    let variant = if let Some(text) = &request.text {
        if text.content.is_empty() {
            return Err(Error::validation("cannot create an empty text item"));
        }
        ResolvedVariant::Text(TextItem {
            content: text.content.clone(),
        })
    } else if let Some(image) = &request.image {
        ResolvedVariant::Image(ImageItem {
            bytes: image.bytes.clone(),
        })
    } else if let Some(fields) = &request.todo_list {
        ResolvedVariant::TodoList(
            fields
                .iter()
                .map(|f| TodoFieldDraft {
                    done: f.done,
                    text: TextItem {
                        content: f.content.clone(),
                    },
                })
                .collect(),
        )
    } else if let Some(shape) = &request.shape {
        ResolvedVariant::Shape(ShapeItem {
            name: shape.name.clone(),
        })
    } else if let Some(drawing) = &request.drawing {
        ResolvedVariant::Drawing(DrawingItem {
            points: drawing
                .points
                .iter()
                .map(|p| Point { x: p.x, y: p.y })
                .collect(),
        })
    } else {
        return Err(Error::validation("exactly one item type required"));
    };

    Ok(ResolvedItem {
        attributes: attributes_of(request),
        variant,
    })
}

fn attributes_of(request: &ItemCreate) -> ItemAttributes {
    let color = match request.color.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_COLOR.to_string(),
    };
    let scale = match request.scale {
        Some(s) if s != 0.0 => s,
        _ => DEFAULT_SCALE,
    };
    ItemAttributes {
        position_x: request.position_x,
        position_y: request.position_y,
        z_index: request.z_index,
        width: request.width,
        height: request.height,
        color,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ImageItemCreate, ShapeItemCreate};

    #[test]
    fn test_resolve_text() {
        let resolved = resolve(&ItemCreate::text("Hello").at(4.0, 5.0)).unwrap();
        assert_eq!(
            resolved.variant,
            ResolvedVariant::Text(TextItem {
                content: "Hello".into()
            })
        );
        assert_eq!(resolved.attributes.position_x, 4.0);
        assert_eq!(resolved.attributes.position_y, 5.0);
    }

    #[test]
    fn test_reject_no_variant() {
        let err = resolve(&ItemCreate::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("exactly one item type")));
    }

    #[test]
    fn test_reject_two_variants() {
        let mut req = ItemCreate::text("a");
        req.image = Some(ImageItemCreate { bytes: "b".into() });
        let err = resolve(&req).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("got 2")));
    }

    #[test]
    fn test_reject_all_variants() {
        let mut req = ItemCreate::text("a");
        req.image = Some(ImageItemCreate { bytes: "b".into() });
        req.shape = Some(ShapeItemCreate { name: "c".into() });
        req.todo_list = Some(vec![]);
        req.drawing = ItemCreate::drawing([(0.0, 0.0)]).drawing;
        assert!(resolve(&req).is_err());
    }

    #[test]
    fn test_reject_empty_text() {
        let err = resolve(&ItemCreate::text("")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_empty_image_and_shape_allowed() {
        let image = resolve(&ItemCreate::image("")).unwrap();
        assert_eq!(image.variant.kind(), ItemKind::Image);
        let shape = resolve(&ItemCreate::shape("")).unwrap();
        assert_eq!(shape.variant.kind(), ItemKind::Shape);
    }

    #[test]
    fn test_todo_fields_keep_order() {
        let resolved = resolve(&ItemCreate::todo_list([("t1", false), ("t2", true)])).unwrap();
        let ResolvedVariant::TodoList(fields) = resolved.variant else {
            panic!("expected todo list");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].text.content, "t1");
        assert!(!fields[0].done);
        assert_eq!(fields[1].text.content, "t2");
        assert!(fields[1].done);
    }

    #[test]
    fn test_drawing_points_verbatim() {
        let pts = [(3.0, 1.0), (0.5, -2.0), (3.0, 1.0)];
        let resolved = resolve(&ItemCreate::drawing(pts)).unwrap();
        let ResolvedVariant::Drawing(drawing) = resolved.variant else {
            panic!("expected drawing");
        };
        let got: Vec<(f64, f64)> = drawing.points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(got, pts);
    }

    #[test]
    fn test_attribute_defaults() {
        let mut req = ItemCreate::shape("rect");
        req.color = Some(String::new());
        req.scale = Some(0.0);
        let resolved = resolve(&req).unwrap();
        assert_eq!(resolved.attributes.color, DEFAULT_COLOR);
        assert_eq!(resolved.attributes.scale, DEFAULT_SCALE);

        req.color = Some("#FF0000".into());
        req.scale = Some(2.5);
        let resolved = resolve(&req).unwrap();
        assert_eq!(resolved.attributes.color, "#FF0000");
        assert_eq!(resolved.attributes.scale, 2.5);
    }
}

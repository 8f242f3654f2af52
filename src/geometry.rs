use crate::schema::ModelRecord;

// ── Node box contract ───────────────────────────────────────────────
// Field anchors are derived from these; changing one moves every edge
// endpoint, so they stay constants rather than configuration.
/// Height of the title band at the top of every node.
pub const HEADER_HEIGHT: f32 = 50.0;
/// Vertical padding around the fields area.
pub const FIELD_AREA_PAD: f32 = 16.0;
/// Height of one field row.
pub const FIELD_ROW_HEIGHT: f32 = 28.0;
/// Height of the "+N more" row shown when fields overflow.
pub const MORE_ROW_HEIGHT: f32 = 24.0;
/// Fields rendered before the rest collapse into "+N more".
pub const VISIBLE_FIELDS_MAX: usize = 5;

/// Axis-aligned box in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            right: x + width,
            top: y,
            bottom: y + height,
        }
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// Pixel height of a node box: header, padded field rows (capped at
/// [`VISIBLE_FIELDS_MAX`]), and an overflow row when fields are hidden.
pub fn node_height(model: &ModelRecord) -> f32 {
    let shown = model.fields.len().min(VISIBLE_FIELDS_MAX);
    let overflow = if model.fields.len() > VISIBLE_FIELDS_MAX {
        MORE_ROW_HEIGHT
    } else {
        0.0
    };
    HEADER_HEIGHT + FIELD_AREA_PAD + shown as f32 * FIELD_ROW_HEIGHT + overflow
}

fn field_row_center(index: usize) -> f32 {
    HEADER_HEIGHT + FIELD_AREA_PAD / 2.0 + index as f32 * FIELD_ROW_HEIGHT + FIELD_ROW_HEIGHT / 2.0
}

/// Y offset (from the node top) of the anchor for a resolved field index.
/// Unresolved anchors fall back to the midpoint of the first field row.
pub fn field_anchor_y(index: Option<usize>) -> f32 {
    field_row_center(index.unwrap_or(0))
}

/// Index of the field a forward relationship anchors to, among the fields
/// that are actually visible. Django emits either the relation name itself
/// (`author`), the column name (`author_id`), or a relation named after the
/// column (`author_id` relating to field `author`).
pub fn anchor_field_index(model: &ModelRecord, rel_name: &str) -> Option<usize> {
    let stripped = rel_name.strip_suffix("_id");
    model
        .fields
        .iter()
        .take(VISIBLE_FIELDS_MAX)
        .position(|field| {
            field.name == rel_name
                || field.name.len() == rel_name.len() + 3
                    && field.name.starts_with(rel_name)
                    && field.name.ends_with("_id")
                || stripped == Some(field.name.as_str())
        })
}

/// Index of the first visible primary-key field.
pub fn pk_field_index(model: &ModelRecord) -> Option<usize> {
    model
        .fields
        .iter()
        .take(VISIBLE_FIELDS_MAX)
        .position(|field| field.primary_key)
}

/// Y offset of the primary-key anchor used by incoming edges.
pub fn pk_anchor_y(model: &ModelRecord) -> f32 {
    field_anchor_y(pk_field_index(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldRecord;

    fn model_with_fields(names: &[&str]) -> ModelRecord {
        ModelRecord {
            fields: names
                .iter()
                .map(|name| FieldRecord {
                    name: name.to_string(),
                    field_type: "CharField".to_string(),
                    ..FieldRecord::default()
                })
                .collect(),
            ..ModelRecord::default()
        }
    }

    #[test]
    fn bounds_expose_edges_and_center() {
        let bounds = Bounds::new(50.0, 50.0, 220.0, 94.0);
        assert_eq!(bounds.right, 270.0);
        assert_eq!(bounds.bottom, 144.0);
        assert_eq!(bounds.center_x(), 160.0);
        assert_eq!(bounds.center_y(), 97.0);
    }

    #[test]
    fn height_counts_visible_fields_and_overflow() {
        assert_eq!(node_height(&model_with_fields(&[])), 66.0);
        assert_eq!(node_height(&model_with_fields(&["a"])), 94.0);
        assert_eq!(node_height(&model_with_fields(&["a", "b", "c", "d", "e"])), 206.0);
        // Sixth field adds the overflow row instead of another field row.
        assert_eq!(
            node_height(&model_with_fields(&["a", "b", "c", "d", "e", "f"])),
            230.0
        );
    }

    #[test]
    fn height_is_monotone_in_field_count() {
        let names: Vec<String> = (0..12).map(|i| format!("f{i}")).collect();
        let mut previous = 0.0;
        for count in 0..names.len() {
            let refs: Vec<&str> = names[..count].iter().map(String::as_str).collect();
            let height = node_height(&model_with_fields(&refs));
            assert!(height >= previous, "height shrank at {count} fields");
            previous = height;
        }
    }

    #[test]
    fn anchor_matches_name_and_id_variants() {
        let model = model_with_fields(&["id", "title", "author_id", "owner"]);
        assert_eq!(anchor_field_index(&model, "author"), Some(2));
        assert_eq!(anchor_field_index(&model, "author_id"), Some(2));
        assert_eq!(anchor_field_index(&model, "owner_id"), Some(3));
        assert_eq!(anchor_field_index(&model, "owner"), Some(3));
        assert_eq!(anchor_field_index(&model, "missing"), None);
    }

    #[test]
    fn anchor_ignores_hidden_fields() {
        let model = model_with_fields(&["a", "b", "c", "d", "e", "buried"]);
        assert_eq!(anchor_field_index(&model, "buried"), None);
    }

    #[test]
    fn anchor_offsets_follow_row_centers() {
        assert_eq!(field_anchor_y(Some(0)), 72.0);
        assert_eq!(field_anchor_y(Some(1)), 100.0);
        assert_eq!(field_anchor_y(Some(4)), 184.0);
        assert_eq!(field_anchor_y(None), 72.0);
    }

    #[test]
    fn pk_anchor_falls_back_to_first_row_midpoint() {
        let mut model = model_with_fields(&["code", "pk_like", "name"]);
        assert_eq!(pk_anchor_y(&model), 72.0);
        model.fields[1].primary_key = true;
        assert_eq!(pk_anchor_y(&model), 100.0);
    }
}

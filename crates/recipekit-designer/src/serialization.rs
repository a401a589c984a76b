//! Template serialization.
//!
//! Converts live shapes to storage-safe [`ShapeRecord`]s and back. Records
//! hold only numbers, strings, booleans and number sequences; bitmaps are
//! reduced to a `hasImage` marker. A shape that cannot be written is
//! replaced by a minimal fallback record so the rest of the template still
//! saves, and a record that cannot be read back is skipped on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::assets::BindingAssets;
use crate::binding::{apply_bindings, bind, BindingTag};
use crate::model::{DesignerShape, Shape, ShapeKind, Style};
use recipekit_core::{Recipe, ShapeValidationError};

/// Template document format version
pub const FORMAT_VERSION: &str = "1.0";

/// Type tag written for shapes that failed to serialize
pub const FALLBACK_TYPE: &str = "unknown";

/// One stored shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub shape_type: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_image: Option<bool>,
    /// Explicit binding tag, for bound shapes whose id is not the tag itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

impl ShapeRecord {
    pub fn new(id: impl Into<String>, shape_type: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            shape_type: shape_type.into(),
            x,
            y,
            width: None,
            height: None,
            radius: None,
            corner_radius: None,
            points: None,
            fill: None,
            stroke: None,
            stroke_width: None,
            opacity: None,
            text: None,
            font_size: None,
            font_family: None,
            bold: None,
            has_image: None,
            binding: None,
        }
    }

    /// `{id, type: "unknown", x: 0, y: 0}`
    pub fn fallback(id: impl Into<String>) -> Self {
        Self::new(id, FALLBACK_TYPE, 0.0, 0.0)
    }

    pub fn is_fallback(&self) -> bool {
        self.shape_type == FALLBACK_TYPE
    }

    /// Copy without bound content: text, the image marker and any content
    /// a binding would overwrite. Used to compare layouts.
    pub fn layout_only(&self) -> Self {
        let mut record = self.clone();
        let bound = self.binding.as_deref().and_then(BindingTag::parse).is_some()
            || BindingTag::parse(&self.id).is_some();
        if bound {
            record.text = None;
            record.has_image = None;
        }
        record
    }
}

/// Ordered shape records of one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTemplateDocument")]
pub struct TemplateDocument {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    pub fields: Vec<ShapeRecord>,
}

impl Default for TemplateDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            modified: None,
            fields: Vec::new(),
        }
    }
}

impl TemplateDocument {
    pub fn new(fields: Vec<ShapeRecord>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Sets the modification time to now.
    pub fn touch(&mut self) {
        self.modified = Some(Utc::now());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Records with bound content stripped.
    pub fn layout(&self) -> Vec<ShapeRecord> {
        self.fields.iter().map(ShapeRecord::layout_only).collect()
    }
}

/// Wire form read leniently: records that are not even well-formed
/// objects are dropped here instead of failing the whole document.
#[derive(Deserialize)]
struct RawTemplateDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
    #[serde(default)]
    fields: Vec<serde_json::Value>,
}

impl From<RawTemplateDocument> for TemplateDocument {
    fn from(raw: RawTemplateDocument) -> Self {
        let fields = raw
            .fields
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<ShapeRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping unreadable shape record");
                    None
                }
            })
            .collect();
        Self {
            version: raw.version.unwrap_or_else(|| FORMAT_VERSION.to_string()),
            modified: raw.modified,
            fields,
        }
    }
}

/// Writes one shape, or reports why it cannot be stored.
pub fn shape_to_record(shape: &Shape) -> Result<ShapeRecord, ShapeValidationError> {
    for (field, value) in [("x", shape.x), ("y", shape.y)] {
        if !value.is_finite() {
            return Err(ShapeValidationError::NonFinite {
                shape_id: shape.id.clone(),
                field,
            });
        }
    }
    let mut record = ShapeRecord::new(&shape.id, shape.shape_type().as_str(), shape.x, shape.y);
    shape.style.write_record(&mut record);
    shape.kind.write_record(&shape.id, &mut record)?;
    // A tag already carried by the id needs no separate field.
    record.binding = shape
        .binding
        .filter(|tag| tag.as_str() != shape.id)
        .map(|tag| tag.as_str().to_string());
    Ok(record)
}

/// Rebuilds one shape from its record, without any bound content.
pub fn record_to_shape(record: &ShapeRecord) -> Result<Shape, ShapeValidationError> {
    for (field, value) in [("x", record.x), ("y", record.y)] {
        if !value.is_finite() {
            return Err(ShapeValidationError::NonFinite {
                shape_id: record.id.clone(),
                field,
            });
        }
    }
    let kind = ShapeKind::from_record(record)?;
    Ok(Shape {
        id: record.id.clone(),
        x: record.x,
        y: record.y,
        style: Style::from_record(record),
        kind,
        binding: record.binding.as_deref().and_then(BindingTag::parse),
    })
}

/// Converts live shapes to a storage-safe document. Never fails: a shape
/// that cannot be written becomes a fallback record in its place.
pub fn serialize(shapes: &[Shape]) -> TemplateDocument {
    let fields = shapes
        .iter()
        .map(|shape| {
            shape_to_record(shape).unwrap_or_else(|e| {
                tracing::warn!(shape_id = %shape.id, error = %e, "Storing fallback record for shape");
                ShapeRecord::fallback(&shape.id)
            })
        })
        .collect();
    TemplateDocument::new(fields)
}

/// Rebuilds shapes from a stored document without binding anything.
/// Fallback and malformed records are skipped; a repeated id keeps its
/// first occurrence.
pub fn restore_shapes(document: &TemplateDocument) -> Vec<Shape> {
    let mut seen = HashSet::new();
    let mut shapes = Vec::with_capacity(document.fields.len());
    for record in &document.fields {
        if record.is_fallback() {
            tracing::warn!(shape_id = %record.id, "Skipping fallback record");
            continue;
        }
        if !seen.insert(record.id.clone()) {
            tracing::warn!(shape_id = %record.id, "Skipping duplicate shape id");
            continue;
        }
        match record_to_shape(record) {
            Ok(shape) => shapes.push(shape),
            Err(e) => {
                tracing::warn!(shape_id = %record.id, error = %e, "Skipping malformed shape record");
            }
        }
    }
    shapes
}

/// Rebuilds shapes and rebinds every tagged one against `recipe`. Stored
/// layout is kept; stored bound content is replaced. Untagged shapes pass
/// through unchanged.
pub fn deserialize(document: &TemplateDocument, recipe: &Recipe, assets: &BindingAssets) -> Vec<Shape> {
    let mut shapes = restore_shapes(document);
    let fields = bind(recipe, assets);
    let bound = apply_bindings(&mut shapes, &fields);
    tracing::debug!(
        recipe_id = %recipe.id,
        shapes = shapes.len(),
        bound,
        "Rehydrated template"
    );
    shapes
}

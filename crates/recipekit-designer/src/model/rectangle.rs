use recipekit_core::{RenderError, ShapeValidationError};
use tiny_skia::{PathBuilder, Rect};

use super::{check_size, require_size, DesignerShape, Point, ShapeType, Style};
use crate::renderer::Surface;
use crate::serialization::ShapeRecord;

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignRectangle {
    pub width: f64,
    pub height: f64,
    /// As authored. Drawing limits it to half of the shorter side.
    pub corner_radius: Option<f64>,
}

impl DesignRectangle {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            corner_radius: None,
        }
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    /// Corner radius limited to half of the shorter side.
    pub fn effective_corner_radius(&self) -> f64 {
        self.corner_radius
            .unwrap_or(0.0)
            .max(0.0)
            .min(self.width.min(self.height) / 2.0)
    }

    pub(crate) fn from_record(record: &ShapeRecord) -> Result<Self, ShapeValidationError> {
        Ok(Self {
            width: require_size(&record.id, "width", record.width)?,
            height: require_size(&record.id, "height", record.height)?,
            corner_radius: record.corner_radius.filter(|r| r.is_finite() && *r >= 0.0),
        })
    }

    fn path(&self, origin: Point) -> Option<tiny_skia::Path> {
        let x = origin.x as f32;
        let y = origin.y as f32;
        let w = self.width as f32;
        let h = self.height as f32;
        let r = self.effective_corner_radius() as f32;
        if r <= 0.0 {
            return Some(PathBuilder::from_rect(Rect::from_xywh(x, y, w, h)?));
        }

        // Quadratic corners are close enough at template scale.
        let mut pb = PathBuilder::new();
        pb.move_to(x + r, y);
        pb.line_to(x + w - r, y);
        pb.quad_to(x + w, y, x + w, y + r);
        pb.line_to(x + w, y + h - r);
        pb.quad_to(x + w, y + h, x + w - r, y + h);
        pb.line_to(x + r, y + h);
        pb.quad_to(x, y + h, x, y + h - r);
        pb.line_to(x, y + r);
        pb.quad_to(x, y, x + r, y);
        pb.close();
        pb.finish()
    }
}

impl DesignerShape for DesignRectangle {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Rectangle
    }

    fn bounds(&self, origin: Point) -> (f64, f64, f64, f64) {
        (
            origin.x,
            origin.y,
            origin.x + self.width,
            origin.y + self.height,
        )
    }

    fn write_record(&self, shape_id: &str, record: &mut ShapeRecord) -> Result<(), ShapeValidationError> {
        record.width = Some(check_size(shape_id, "width", self.width)?);
        record.height = Some(check_size(shape_id, "height", self.height)?);
        record.corner_radius = match self.corner_radius {
            Some(r) => Some(check_size(shape_id, "cornerRadius", r)?),
            None => None,
        };
        Ok(())
    }

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError> {
        // Zero-area rectangles have nothing to draw.
        if let Some(path) = self.path(origin) {
            surface.paint(&path, style);
        }
        Ok(())
    }
}

use recipekit_core::{RenderError, ShapeValidationError};
use tiny_skia::PathBuilder;

use super::{check_size, require_size, DesignerShape, Point, ShapeType, Style};
use crate::renderer::Surface;
use crate::serialization::ShapeRecord;

/// Circle anchored at its center.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignCircle {
    pub radius: f64,
}

impl DesignCircle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub(crate) fn from_record(record: &ShapeRecord) -> Result<Self, ShapeValidationError> {
        Ok(Self {
            radius: require_size(&record.id, "radius", record.radius)?,
        })
    }
}

impl DesignerShape for DesignCircle {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Circle
    }

    fn bounds(&self, origin: Point) -> (f64, f64, f64, f64) {
        (
            origin.x - self.radius,
            origin.y - self.radius,
            origin.x + self.radius,
            origin.y + self.radius,
        )
    }

    fn contains_point(&self, origin: Point, p: Point, tolerance: f64) -> bool {
        origin.distance_to(&p) <= self.radius + tolerance
    }

    fn write_record(&self, shape_id: &str, record: &mut ShapeRecord) -> Result<(), ShapeValidationError> {
        record.radius = Some(check_size(shape_id, "radius", self.radius)?);
        Ok(())
    }

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError> {
        if let Some(path) = PathBuilder::from_circle(origin.x as f32, origin.y as f32, self.radius as f32) {
            surface.paint(&path, style);
        }
        Ok(())
    }
}

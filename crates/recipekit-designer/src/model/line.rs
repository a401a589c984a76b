use recipekit_core::{RenderError, ShapeValidationError};
use tiny_skia::PathBuilder;

use super::{DesignerShape, Point, ShapeType, Style};
use crate::renderer::Surface;
use crate::serialization::ShapeRecord;

/// Open polyline. Points are relative to the owning shape's anchor, so
/// moving the shape never rewrites them.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignLine {
    pub points: Vec<Point>,
}

impl DesignLine {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Straight segment from the anchor to `(dx, dy)`.
    pub fn segment(dx: f64, dy: f64) -> Self {
        Self::new(vec![Point::new(0.0, 0.0), Point::new(dx, dy)])
    }

    pub(crate) fn from_record(record: &ShapeRecord) -> Result<Self, ShapeValidationError> {
        let coords = record.points.as_deref().ok_or_else(|| ShapeValidationError::MissingField {
            shape_id: record.id.clone(),
            field: "points",
        })?;
        if coords.len() < 4 || coords.len() % 2 != 0 {
            return Err(ShapeValidationError::BadPoints {
                shape_id: record.id.clone(),
                count: coords.len(),
            });
        }
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(ShapeValidationError::NonFinite {
                shape_id: record.id.clone(),
                field: "points",
            });
        }
        Ok(Self::new(
            coords
                .chunks_exact(2)
                .map(|pair| Point::new(pair[0], pair[1]))
                .collect(),
        ))
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (abx, aby) = a.delta_to(&b);
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * abx, a.y + t * aby))
}

impl DesignerShape for DesignLine {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Line
    }

    fn bounds(&self, origin: Point) -> (f64, f64, f64, f64) {
        if self.points.is_empty() {
            return (origin.x, origin.y, origin.x, origin.y);
        }
        self.points.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x1, y1, x2, y2), p| {
                let x = origin.x + p.x;
                let y = origin.y + p.y;
                (x1.min(x), y1.min(y), x2.max(x), y2.max(y))
            },
        )
    }

    fn contains_point(&self, origin: Point, p: Point, tolerance: f64) -> bool {
        let abs: Vec<Point> = self.points.iter().map(|q| q.offset(origin.x, origin.y)).collect();
        abs.windows(2)
            .any(|w| distance_to_segment(p, w[0], w[1]) <= tolerance)
    }

    fn write_record(&self, shape_id: &str, record: &mut ShapeRecord) -> Result<(), ShapeValidationError> {
        if self.points.len() < 2 {
            return Err(ShapeValidationError::BadPoints {
                shape_id: shape_id.to_string(),
                count: self.points.len() * 2,
            });
        }
        let mut coords = Vec::with_capacity(self.points.len() * 2);
        for p in &self.points {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(ShapeValidationError::NonFinite {
                    shape_id: shape_id.to_string(),
                    field: "points",
                });
            }
            coords.push(p.x);
            coords.push(p.y);
        }
        record.points = Some(coords);
        Ok(())
    }

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError> {
        let mut iter = self.points.iter().map(|p| p.offset(origin.x, origin.y));
        let Some(first) = iter.next() else {
            return Ok(());
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in iter {
            pb.line_to(p.x as f32, p.y as f32);
        }
        if let Some(path) = pb.finish() {
            // Lines never fill.
            let stroke_only = Style {
                fill: None,
                ..style.clone()
            };
            surface.paint(&path, &stroke_only);
        }
        Ok(())
    }
}

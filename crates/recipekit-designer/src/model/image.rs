use recipekit_core::{RenderError, ShapeValidationError};
use tiny_skia::{PathBuilder, Rect};

use super::{check_size, require_size, Color, DesignerShape, Point, ShapeType, Style};
use crate::assets::Bitmap;
use crate::renderer::Surface;
use crate::serialization::ShapeRecord;

/// Image frame anchored at its top-left corner. The bitmap is scaled to
/// fill the frame; until one is bound the frame draws as an empty box.
///
/// `bitmap_opacity` belongs to the bound content, not the layout: it is set
/// by field binding (the watermark is drawn faint) and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignImage {
    pub width: f64,
    pub height: f64,
    pub bitmap: Option<Bitmap>,
    pub bitmap_opacity: f64,
}

impl DesignImage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            bitmap: None,
            bitmap_opacity: 1.0,
        }
    }

    pub fn with_bitmap(mut self, bitmap: Bitmap) -> Self {
        self.bitmap = Some(bitmap);
        self
    }

    /// Replaces the bound bitmap and its opacity multiplier.
    pub fn set_bitmap(&mut self, bitmap: Bitmap, opacity: f64) {
        self.bitmap = Some(bitmap);
        self.bitmap_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Bitmaps are never persisted; a stored frame comes back empty and is
    /// filled again by field binding.
    pub(crate) fn from_record(record: &ShapeRecord) -> Result<Self, ShapeValidationError> {
        Ok(Self::new(
            require_size(&record.id, "width", record.width)?,
            require_size(&record.id, "height", record.height)?,
        ))
    }
}

impl DesignerShape for DesignImage {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Image
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
        record.has_image = Some(self.bitmap.is_some());
        Ok(())
    }

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError> {
        match &self.bitmap {
            Some(bitmap) => surface.draw_bitmap(
                bitmap,
                origin.x,
                origin.y,
                self.width,
                self.height,
                style.effective_opacity() * self.bitmap_opacity,
            ),
            None => {
                let frame = Rect::from_xywh(
                    origin.x as f32,
                    origin.y as f32,
                    self.width as f32,
                    self.height as f32,
                );
                if let Some(rect) = frame {
                    let empty = Style {
                        fill: Some(Color::rgb(0xee, 0xee, 0xee).into()),
                        stroke: Some(Color::rgb(0x99, 0x99, 0x99).into()),
                        stroke_width: Some(1.0),
                        opacity: style.opacity,
                    };
                    surface.paint(&PathBuilder::from_rect(rect), &empty);
                }
                Ok(())
            }
        }
    }
}

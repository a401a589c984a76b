use recipekit_core::{RenderError, ShapeValidationError};
use rusttype::{Font, Scale};

use super::{check_size, Color, DesignerShape, Point, ShapeType, Style};
use crate::font_manager;
use crate::renderer::Surface;
use crate::serialization::ShapeRecord;

pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Advance used when no font is available, as a fraction of the font size.
const FALLBACK_ADVANCE: f64 = 0.55;

/// Text block anchored at its top-left corner. When `width` is set, lines
/// wrap at word boundaries to fit it.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignText {
    pub text: String,
    pub font_size: f64,
    pub width: Option<f64>,
    pub font_family: String,
    pub bold: bool,
}

impl DesignText {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
            width: None,
            font_family: "Sans".to_string(),
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub(crate) fn from_record(record: &ShapeRecord) -> Self {
        Self {
            text: record.text.clone().unwrap_or_default(),
            font_size: record
                .font_size
                .filter(|s| s.is_finite() && *s >= 0.0)
                .unwrap_or(DEFAULT_FONT_SIZE),
            width: record.width.filter(|w| w.is_finite() && *w >= 0.0),
            font_family: record
                .font_family
                .clone()
                .unwrap_or_else(|| "Sans".to_string()),
            bold: record.bold.unwrap_or(false),
        }
    }

    fn font(&self) -> Option<&'static Font<'static>> {
        font_manager::get_font_for(&self.font_family, self.bold)
    }

    fn measure(&self, font: Option<&Font<'_>>, s: &str) -> f64 {
        match font {
            Some(font) => {
                let scale = Scale::uniform(self.font_size as f32);
                s.chars()
                    .map(|c| font.glyph(c).scaled(scale).h_metrics().advance_width as f64)
                    .sum()
            }
            None => s.chars().count() as f64 * self.font_size * FALLBACK_ADVANCE,
        }
    }

    /// Splits the text into display lines: hard breaks first, then greedy
    /// word wrapping when a width is set. A word wider than the box gets a
    /// line to itself.
    pub fn layout_lines(&self) -> Vec<String> {
        let font = self.font();
        let mut lines = Vec::new();
        for paragraph in self.text.split('\n') {
            let Some(max) = self.width else {
                lines.push(paragraph.to_string());
                continue;
            };
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if !current.is_empty() && self.measure(font, &candidate) > max {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        lines
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT
    }
}

impl DesignerShape for DesignText {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Text
    }

    fn bounds(&self, origin: Point) -> (f64, f64, f64, f64) {
        let lines = self.layout_lines();
        let width = match self.width {
            Some(w) => w,
            None => {
                let font = self.font();
                lines
                    .iter()
                    .map(|l| self.measure(font, l))
                    .fold(0.0, f64::max)
            }
        };
        let height = lines.len() as f64 * self.line_height();
        (origin.x, origin.y, origin.x + width, origin.y + height)
    }

    fn write_record(&self, shape_id: &str, record: &mut ShapeRecord) -> Result<(), ShapeValidationError> {
        record.text = Some(self.text.clone());
        record.font_size = Some(check_size(shape_id, "fontSize", self.font_size)?);
        record.width = match self.width {
            Some(w) => Some(check_size(shape_id, "width", w)?),
            None => None,
        };
        record.font_family = (self.font_family != "Sans").then(|| self.font_family.clone());
        record.bold = self.bold.then_some(true);
        Ok(())
    }

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError> {
        let Some(font) = self.font() else {
            tracing::debug!("Skipping text without a font");
            return Ok(());
        };
        let color = style.fill_color().unwrap_or(Color::BLACK).to_skia(style.effective_opacity());
        let mut top = origin.y;
        for line in self.layout_lines() {
            surface.draw_text(font, &line, origin.x as f32, top as f32, self.font_size as f32, color);
            top += self.line_height();
        }
        Ok(())
    }
}

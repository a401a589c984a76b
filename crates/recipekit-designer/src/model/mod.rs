//! Shape model for the template designer.
//!
//! A [`Shape`] is one visual primitive on the page: an id, an anchor
//! position, a style, an optional binding tag and a [`ShapeKind`] carrying
//! the kind-specific geometry and content. Every kind implements
//! [`DesignerShape`], so rendering, hit-testing and serialization dispatch
//! through one enum instead of comparing type strings.

use serde::{Deserialize, Serialize};

use recipekit_core::{RenderError, ShapeValidationError};

use crate::binding::BindingTag;
use crate::renderer::Surface;
use crate::serialization::ShapeRecord;

mod circle;
mod image;
mod line;
mod rectangle;
mod text;

pub use circle::DesignCircle;
pub use image::DesignImage;
pub use line::DesignLine;
pub use rectangle::DesignRectangle;
pub use text::{DesignText, DEFAULT_FONT_SIZE, LINE_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Vector from `self` to `other` as `(dx, dy)`.
    pub fn delta_to(&self, other: &Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

/// 8-bit RGBA color, written as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
                Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Parses the color forms found in stored templates: hex, `rgb()`,
    /// `rgba()` and the basic CSS color names.
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::parse_hex(value);
        }
        let lower = value.to_ascii_lowercase();
        if let Some(inner) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(inner);
        }
        let named = match lower.as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "lime" => Color::rgb(0, 255, 0),
            "blue" => Color::rgb(0, 0, 255),
            "navy" => Color::rgb(0, 0, 128),
            "yellow" => Color::rgb(255, 255, 0),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "silver" => Color::rgb(192, 192, 192),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(128, 0, 128),
            "maroon" => Color::rgb(128, 0, 0),
            "brown" => Color::rgb(165, 42, 42),
            "cyan" | "aqua" => Color::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
            "teal" => Color::rgb(0, 128, 128),
            "olive" => Color::rgb(128, 128, 0),
            "transparent" => Color::rgba(0, 0, 0, 0),
            _ => return None,
        };
        Some(named)
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Converts to a tiny-skia color with `opacity` folded into alpha.
    pub fn to_skia(&self, opacity: f64) -> tiny_skia::Color {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// `r, g, b` or `r, g, b, a` with channels 0-255 and alpha 0-1.
fn parse_rgb_function(inner: &str) -> Option<Color> {
    let parts: Vec<f64> = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;
    let channel = |v: f64| v.clamp(0.0, 255.0).round() as u8;
    match parts.as_slice() {
        [r, g, b] => Some(Color::rgb(channel(*r), channel(*g), channel(*b))),
        [r, g, b, a] => Some(Color::rgba(
            channel(*r),
            channel(*g),
            channel(*b),
            (a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )),
        _ => None,
    }
}

/// A fill or stroke color as authored.
///
/// The text is kept exactly as stored so a template written with `black`
/// or `rgb(...)` saves back unchanged. `color` is what gets drawn; text
/// that names no color we understand stores fine but draws as unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    text: String,
    color: Option<Color>,
}

impl Paint {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let color = Color::parse_css(&text);
        Self { text, color }
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self {
            text: color.to_hex(),
            color: Some(color),
        }
    }
}

/// Visual style shared by every shape kind. Unset fields use the kind's default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
}

impl Style {
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.as_ref().and_then(Paint::color)
    }

    pub fn stroke_color(&self) -> Option<Color> {
        self.stroke.as_ref().and_then(Paint::color)
    }

    pub fn effective_opacity(&self) -> f64 {
        self.opacity
            .filter(|o| o.is_finite())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    pub fn stroke_width_or(&self, default: f64) -> f64 {
        self.stroke_width
            .filter(|w| w.is_finite() && *w >= 0.0)
            .unwrap_or(default)
    }

    /// Writes the coercible style fields; anything that fails coercion is left out.
    pub(crate) fn write_record(&self, record: &mut ShapeRecord) {
        record.fill = self.fill.as_ref().map(|p| p.as_str().to_string());
        record.stroke = self.stroke.as_ref().map(|p| p.as_str().to_string());
        record.stroke_width = self.stroke_width.filter(|w| w.is_finite() && *w >= 0.0);
        record.opacity = self
            .opacity
            .filter(|o| o.is_finite())
            .map(|o| o.clamp(0.0, 1.0));
    }

    pub(crate) fn from_record(record: &ShapeRecord) -> Self {
        Self {
            fill: record.fill.as_deref().map(Paint::parse),
            stroke: record.stroke.as_deref().map(Paint::parse),
            stroke_width: record.stroke_width.filter(|w| w.is_finite() && *w >= 0.0),
            opacity: record
                .opacity
                .filter(|o| o.is_finite())
                .map(|o| o.clamp(0.0, 1.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
    Circle,
    Line,
    Text,
    Image,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Circle => "circle",
            ShapeType::Line => "line",
            ShapeType::Text => "text",
            ShapeType::Image => "image",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Some(ShapeType::Rectangle),
            "circle" => Some(ShapeType::Circle),
            "line" => Some(ShapeType::Line),
            "text" => Some(ShapeType::Text),
            "image" => Some(ShapeType::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform contract every shape kind implements.
///
/// Geometry is relative to the owning shape's anchor `origin`.
pub trait DesignerShape {
    fn shape_type(&self) -> ShapeType;

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
    fn bounds(&self, origin: Point) -> (f64, f64, f64, f64);

    fn contains_point(&self, origin: Point, p: Point, tolerance: f64) -> bool {
        let (x1, y1, x2, y2) = self.bounds(origin);
        p.x >= x1 - tolerance && p.x <= x2 + tolerance && p.y >= y1 - tolerance && p.y <= y2 + tolerance
    }

    /// Writes the kind-specific fields of the storage record.
    fn write_record(&self, shape_id: &str, record: &mut ShapeRecord) -> Result<(), ShapeValidationError>;

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rectangle(DesignRectangle),
    Circle(DesignCircle),
    Line(DesignLine),
    Text(DesignText),
    Image(DesignImage),
}

impl DesignerShape for ShapeKind {
    fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Rectangle(s) => s.shape_type(),
            ShapeKind::Circle(s) => s.shape_type(),
            ShapeKind::Line(s) => s.shape_type(),
            ShapeKind::Text(s) => s.shape_type(),
            ShapeKind::Image(s) => s.shape_type(),
        }
    }

    fn bounds(&self, origin: Point) -> (f64, f64, f64, f64) {
        match self {
            ShapeKind::Rectangle(s) => s.bounds(origin),
            ShapeKind::Circle(s) => s.bounds(origin),
            ShapeKind::Line(s) => s.bounds(origin),
            ShapeKind::Text(s) => s.bounds(origin),
            ShapeKind::Image(s) => s.bounds(origin),
        }
    }

    fn contains_point(&self, origin: Point, p: Point, tolerance: f64) -> bool {
        match self {
            ShapeKind::Rectangle(s) => s.contains_point(origin, p, tolerance),
            ShapeKind::Circle(s) => s.contains_point(origin, p, tolerance),
            ShapeKind::Line(s) => s.contains_point(origin, p, tolerance),
            ShapeKind::Text(s) => s.contains_point(origin, p, tolerance),
            ShapeKind::Image(s) => s.contains_point(origin, p, tolerance),
        }
    }

    fn write_record(&self, shape_id: &str, record: &mut ShapeRecord) -> Result<(), ShapeValidationError> {
        match self {
            ShapeKind::Rectangle(s) => s.write_record(shape_id, record),
            ShapeKind::Circle(s) => s.write_record(shape_id, record),
            ShapeKind::Line(s) => s.write_record(shape_id, record),
            ShapeKind::Text(s) => s.write_record(shape_id, record),
            ShapeKind::Image(s) => s.write_record(shape_id, record),
        }
    }

    fn render(&self, origin: Point, style: &Style, surface: &mut Surface) -> Result<(), RenderError> {
        match self {
            ShapeKind::Rectangle(s) => s.render(origin, style, surface),
            ShapeKind::Circle(s) => s.render(origin, style, surface),
            ShapeKind::Line(s) => s.render(origin, style, surface),
            ShapeKind::Text(s) => s.render(origin, style, surface),
            ShapeKind::Image(s) => s.render(origin, style, surface),
        }
    }
}

impl ShapeKind {
    /// Rebuilds the kind-specific part of a stored record.
    pub(crate) fn from_record(record: &ShapeRecord) -> Result<Self, ShapeValidationError> {
        let shape_type =
            ShapeType::parse(&record.shape_type).ok_or_else(|| ShapeValidationError::UnknownType {
                shape_id: record.id.clone(),
                shape_type: record.shape_type.clone(),
            })?;
        Ok(match shape_type {
            ShapeType::Rectangle => ShapeKind::Rectangle(DesignRectangle::from_record(record)?),
            ShapeType::Circle => ShapeKind::Circle(DesignCircle::from_record(record)?),
            ShapeType::Line => ShapeKind::Line(DesignLine::from_record(record)?),
            ShapeType::Text => ShapeKind::Text(DesignText::from_record(record)),
            ShapeType::Image => ShapeKind::Image(DesignImage::from_record(record)?),
        })
    }

    fn apply_patch(&mut self, patch: &ShapePatch) {
        match self {
            ShapeKind::Rectangle(r) => {
                if let Some(w) = patch.width {
                    r.width = w;
                }
                if let Some(h) = patch.height {
                    r.height = h;
                }
            }
            ShapeKind::Circle(c) => {
                if let Some(radius) = patch.radius {
                    c.radius = radius;
                }
            }
            ShapeKind::Line(l) => {
                if let Some(points) = &patch.points {
                    l.points = points.clone();
                }
            }
            ShapeKind::Text(t) => {
                if let Some(text) = &patch.text {
                    t.text = text.clone();
                }
                if let Some(size) = patch.font_size {
                    t.font_size = size;
                }
                if let Some(w) = patch.width {
                    t.width = Some(w);
                }
            }
            ShapeKind::Image(i) => {
                if let Some(w) = patch.width {
                    i.width = w;
                }
                if let Some(h) = patch.height {
                    i.height = h;
                }
            }
        }
    }
}

/// One visual primitive placed on a template page.
///
/// Render order is not stored here; it is the shape's position in the
/// owning [`ShapeStore`](crate::shape_store::ShapeStore).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub style: Style,
    pub kind: ShapeKind,
    pub binding: Option<BindingTag>,
}

impl Shape {
    pub fn new(id: impl Into<String>, x: f64, y: f64, kind: ShapeKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            style: Style::default(),
            kind,
            binding: None,
        }
    }

    /// Rectangle with its top-left corner at `(x, y)`.
    pub fn rectangle(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(id, x, y, ShapeKind::Rectangle(DesignRectangle::new(width, height)))
    }

    /// Circle centered on `(cx, cy)`.
    pub fn circle(id: impl Into<String>, cx: f64, cy: f64, radius: f64) -> Self {
        Self::new(id, cx, cy, ShapeKind::Circle(DesignCircle::new(radius)))
    }

    /// Polyline anchored at `(x, y)`; `points` are relative to the anchor.
    pub fn line(id: impl Into<String>, x: f64, y: f64, points: Vec<Point>) -> Self {
        Self::new(id, x, y, ShapeKind::Line(DesignLine::new(points)))
    }

    /// Text block with its top-left corner at `(x, y)`.
    pub fn text(id: impl Into<String>, x: f64, y: f64, text: impl Into<String>, font_size: f64) -> Self {
        Self::new(id, x, y, ShapeKind::Text(DesignText::new(text, font_size)))
    }

    /// Image frame with its top-left corner at `(x, y)` and no bitmap yet.
    pub fn image(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(id, x, y, ShapeKind::Image(DesignImage::new(width, height)))
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.style.fill = Some(color.into());
        self
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.style.stroke = Some(color.into());
        self.style.stroke_width = Some(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = Some(opacity);
        self
    }

    pub fn with_wrap_width(mut self, width: f64) -> Self {
        if let ShapeKind::Text(t) = &mut self.kind {
            t.width = Some(width);
        }
        self
    }

    pub fn bound_to(mut self, tag: BindingTag) -> Self {
        self.binding = Some(tag);
        self
    }

    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.kind.bounds(self.position())
    }

    pub fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        let slack = match self.kind {
            ShapeKind::Line(_) => tolerance.max(self.style.stroke_width_or(1.0) / 2.0),
            _ => tolerance,
        };
        self.kind.contains_point(self.position(), p, slack)
    }

    /// The binding tag this shape answers to: an explicit tag, else its id.
    pub fn binding_tag(&self) -> Option<BindingTag> {
        self.binding.or_else(|| BindingTag::parse(&self.id))
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::Text(t) => Some(&t.text),
            _ => None,
        }
    }

    pub fn render(&self, surface: &mut Surface) -> Result<(), RenderError> {
        self.kind.render(self.position(), &self.style, surface)
    }

    /// Shallow merge: every field present in `patch` overwrites the shape's value.
    /// Geometry fields that do not apply to this kind are ignored.
    pub fn apply_patch(&mut self, patch: &ShapePatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(fill) = patch.fill {
            self.style.fill = Some(fill.into());
        }
        if let Some(stroke) = patch.stroke {
            self.style.stroke = Some(stroke.into());
        }
        if let Some(w) = patch.stroke_width {
            self.style.stroke_width = Some(w);
        }
        if let Some(o) = patch.opacity {
            self.style.opacity = Some(o);
        }
        if let Some(binding) = patch.binding {
            self.binding = binding;
        }
        self.kind.apply_patch(patch);
    }
}

/// Partial shape update for [`ShapeStore::update`](crate::shape_store::ShapeStore::update).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub radius: Option<f64>,
    pub points: Option<Vec<Point>>,
    pub binding: Option<Option<BindingTag>>,
}

impl ShapePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn stroke(mut self, color: Color) -> Self {
        self.stroke = Some(color);
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn binding(mut self, tag: Option<BindingTag>) -> Self {
        self.binding = Some(tag);
        self
    }
}

/// Checks a required numeric field: present, finite and non-negative.
pub(crate) fn require_size(
    shape_id: &str,
    field: &'static str,
    value: Option<f64>,
) -> Result<f64, ShapeValidationError> {
    let value = value.ok_or_else(|| ShapeValidationError::MissingField {
        shape_id: shape_id.to_string(),
        field,
    })?;
    check_size(shape_id, field, value)
}

/// Checks a live numeric size: finite and non-negative.
pub(crate) fn check_size(
    shape_id: &str,
    field: &'static str,
    value: f64,
) -> Result<f64, ShapeValidationError> {
    if !value.is_finite() {
        return Err(ShapeValidationError::NonFinite {
            shape_id: shape_id.to_string(),
            field,
        });
    }
    if value < 0.0 {
        return Err(ShapeValidationError::Negative {
            shape_id: shape_id.to_string(),
            field,
            value,
        });
    }
    Ok(value)
}

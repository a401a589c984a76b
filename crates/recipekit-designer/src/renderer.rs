//! Rasterization of shape sets using tiny-skia.
//!
//! Features:
//! - Anti-aliased fills and strokes in page coordinates (one point per pixel)
//! - Text drawn glyph by glyph through rusttype
//! - Bitmaps scaled into their frames, with foreign-origin taint tracking
//! - Grid guides and selection indicators for the editor view, never in exports
//!
//! A [`Surface`] goes through an explicit create, draw, export, destroy
//! lifecycle. Each render call creates its own surface, so a failed call
//! never leaves pixel state behind for the next one.

use crate::assets::Bitmap;
use crate::model::{Color, Shape, Style};
use image::{ImageFormat, Rgba, RgbaImage};
use recipekit_core::RenderError;
use rusttype::{point as rt_point, Font, Scale};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::ops::Deref;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Rect, Stroke, Transform,
};

/// US Letter landscape, in points.
pub const PAGE_WIDTH: u32 = 792;
pub const PAGE_HEIGHT: u32 = 612;

fn guide_color() -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(52, 152, 219, 70)
}
fn selection_color() -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(255, 193, 7, 255)
}

const HANDLE_SIZE: f32 = 6.0;

fn solid(color: tiny_skia::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// In-memory pixel buffer that one shape set is drawn onto.
pub struct Surface {
    pixmap: Pixmap,
    tainted_by: Option<String>,
}

impl Surface {
    pub fn create(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceUnavailable { width, height })?;
        tracing::debug!(width, height, "Created rasterization surface");
        Ok(Self {
            pixmap,
            tainted_by: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia(1.0));
    }

    /// Source path of the first foreign bitmap drawn, if any.
    pub fn tainted_by(&self) -> Option<&str> {
        self.tainted_by.as_deref()
    }

    pub fn fill_path(&mut self, path: &tiny_skia::Path, color: tiny_skia::Color) {
        self.pixmap
            .fill_path(path, &solid(color), FillRule::Winding, Transform::identity(), None);
    }

    pub fn stroke_path(&mut self, path: &tiny_skia::Path, color: tiny_skia::Color, width: f32) {
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &solid(color), &stroke, Transform::identity(), None);
    }

    /// Fills and strokes `path` with `style`. A style with neither fill nor
    /// stroke gets a one-point black outline so the shape stays visible.
    pub fn paint(&mut self, path: &tiny_skia::Path, style: &Style) {
        let opacity = style.effective_opacity();
        let fill = style.fill_color();
        if let Some(fill) = fill {
            self.fill_path(path, fill.to_skia(opacity));
        }
        let stroke = style
            .stroke_color()
            .or_else(|| fill.is_none().then_some(Color::BLACK));
        let width = style.stroke_width_or(1.0);
        if let Some(stroke) = stroke {
            if width > 0.0 {
                self.stroke_path(path, stroke.to_skia(opacity), width as f32);
            }
        }
    }

    /// Draws `bitmap` scaled into the `w` x `h` frame at `(x, y)`.
    pub fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        opacity: f64,
    ) -> Result<(), RenderError> {
        if let Some(source) = bitmap.foreign_source() {
            if self.tainted_by.is_none() {
                tracing::debug!(source, "Surface tainted by foreign bitmap");
                self.tainted_by = Some(source.to_string());
            }
        }
        if !(w > 0.0 && h > 0.0) {
            return Ok(());
        }
        let Some(src) = to_pixmap(bitmap.pixels()) else {
            return Ok(());
        };
        let sx = (w / bitmap.width() as f64) as f32;
        let sy = (h / bitmap.height() as f64) as f32;
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            src.as_ref(),
            &paint,
            Transform::from_row(sx, 0.0, 0.0, sy, x as f32, y as f32),
            None,
        );
        Ok(())
    }

    /// Draws one line of text with its top edge at `top`.
    pub fn draw_text(
        &mut self,
        font: &Font<'_>,
        text: &str,
        x: f32,
        top: f32,
        size: f32,
        color: tiny_skia::Color,
    ) {
        let scale = Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);
        let start = rt_point(x, top + v_metrics.ascent);
        let width = self.width() as i32;
        let height = self.height() as i32;

        for glyph in font.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            let pixels = self.pixmap.pixels_mut();
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px >= 0 && px < width && py >= 0 && py < height {
                    let idx = (py * width + px) as usize;
                    pixels[idx] = blend(pixels[idx], color, coverage);
                }
            });
        }
    }

    /// Reads the pixels back for export. Fails once a foreign bitmap has
    /// been drawn.
    pub fn export(&self) -> Result<Raster, RenderError> {
        if let Some(source) = &self.tainted_by {
            return Err(RenderError::TaintedSurface {
                source_path: source.clone(),
            });
        }
        Ok(self.present())
    }

    /// Pixels for on-screen display, where taint does not apply.
    pub fn present(&self) -> Raster {
        let mut image = RgbaImage::new(self.width(), self.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Raster { image }
    }

    pub fn destroy(self) {
        tracing::debug!(
            width = self.width(),
            height = self.height(),
            "Released rasterization surface"
        );
    }
}

/// Source-over blend of a straight-alpha color at `coverage` onto a
/// premultiplied pixel.
fn blend(dst: PremultipliedColorU8, color: tiny_skia::Color, coverage: f32) -> PremultipliedColorU8 {
    let sa = (color.alpha() * coverage).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let inv = 1.0 - sa;
    let a = sa * 255.0 + dst.alpha() as f32 * inv;
    let channel = |src: f32, d: u8| (src * sa * 255.0 + d as f32 * inv).min(a).round() as u8;
    let r = channel(color.red(), dst.red());
    let g = channel(color.green(), dst.green());
    let b = channel(color.blue(), dst.blue());
    PremultipliedColorU8::from_rgba(r, g, b, a.round() as u8).unwrap_or(dst)
}

/// Read-back RGBA pixels of one rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| RenderError::Encode {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }

    /// Packed RGB with alpha composited over white.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for px in self.image.pixels() {
            let [r, g, b, a] = px.0;
            let a = a as u32;
            for c in [r, g, b] {
                out.push(((c as u32 * a + 255 * (255 - a)) / 255) as u8);
            }
        }
        out
    }
}

/// Editor-only grid guides.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideOverlay {
    visible: bool,
    spacing: f64,
}

impl GuideOverlay {
    pub fn new(visible: bool, spacing: f64) -> Self {
        Self { visible, spacing }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: f64) {
        self.spacing = spacing;
    }

    /// Hides the guides until the returned guard drops. The previous
    /// visibility comes back on every exit path, including errors.
    pub fn hide_for_export(&mut self) -> GuideGuard<'_> {
        let was_visible = self.visible;
        self.visible = false;
        GuideGuard {
            overlay: self,
            was_visible,
        }
    }
}

impl Default for GuideOverlay {
    fn default() -> Self {
        Self::new(true, 20.0)
    }
}

pub struct GuideGuard<'a> {
    overlay: &'a mut GuideOverlay,
    was_visible: bool,
}

impl Deref for GuideGuard<'_> {
    type Target = GuideOverlay;

    fn deref(&self) -> &GuideOverlay {
        self.overlay
    }
}

impl Drop for GuideGuard<'_> {
    fn drop(&mut self) {
        self.overlay.visible = self.was_visible;
    }
}

/// Renders shape sets to page-sized rasters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPipeline {
    width: u32,
    height: u32,
    background: Color,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(PAGE_WIDTH, PAGE_HEIGHT)
    }
}

impl RenderPipeline {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::WHITE,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn draw(
        &self,
        shapes: &[Shape],
        guides: &GuideOverlay,
        selected: Option<&BTreeSet<String>>,
    ) -> Result<Surface, RenderError> {
        let mut surface = Surface::create(self.width, self.height)?;
        surface.clear(self.background);
        if guides.is_visible() {
            self.draw_guides(&mut surface, guides.spacing());
        }
        for shape in shapes {
            if let Err(e) = shape.render(&mut surface) {
                surface.destroy();
                return Err(e);
            }
        }
        if let Some(selected) = selected {
            for shape in shapes.iter().filter(|s| selected.contains(&s.id)) {
                draw_selection(&mut surface, shape);
            }
        }
        Ok(surface)
    }

    fn draw_guides(&self, surface: &mut Surface, spacing: f64) {
        if !(spacing.is_finite() && spacing > 0.0) {
            return;
        }
        let mut pb = PathBuilder::new();
        let mut x = spacing;
        while x < self.width as f64 {
            pb.move_to(x as f32, 0.0);
            pb.line_to(x as f32, self.height as f32);
            x += spacing;
        }
        let mut y = spacing;
        while y < self.height as f64 {
            pb.move_to(0.0, y as f32);
            pb.line_to(self.width as f32, y as f32);
            y += spacing;
        }
        if let Some(path) = pb.finish() {
            surface.stroke_path(&path, guide_color(), 1.0);
        }
    }

    /// Draws `shapes` in order on a fresh surface and reads the pixels back.
    pub fn rasterize(&self, shapes: &[Shape]) -> Result<Raster, RenderError> {
        let surface = self.draw(shapes, &GuideOverlay::new(false, 0.0), None)?;
        let raster = surface.export();
        surface.destroy();
        raster
    }

    /// Editor view: guides (when visible) and selection indicators included.
    pub fn render_view(
        &self,
        shapes: &[Shape],
        guides: &GuideOverlay,
        selected: &BTreeSet<String>,
    ) -> Result<Raster, RenderError> {
        let surface = self.draw(shapes, guides, Some(selected))?;
        let raster = surface.present();
        surface.destroy();
        Ok(raster)
    }

    /// Export with the guides hidden for the duration of the call.
    pub fn export(&self, shapes: &[Shape], guides: &mut GuideOverlay) -> Result<Raster, RenderError> {
        let hidden = guides.hide_for_export();
        let surface = self.draw(shapes, &hidden, None)?;
        let raster = surface.export();
        surface.destroy();
        raster
    }
}

fn draw_selection(surface: &mut Surface, shape: &Shape) {
    let (x1, y1, x2, y2) = shape.bounds();
    let Some(rect) = Rect::from_ltrb(x1 as f32, y1 as f32, x2.max(x1 + 1.0) as f32, y2.max(y1 + 1.0) as f32)
    else {
        return;
    };
    surface.stroke_path(&PathBuilder::from_rect(rect), selection_color(), 1.0);

    let corners = [(x1, y1), (x2, y1), (x1, y2), (x2, y2)];
    for (hx, hy) in corners {
        let handle = Rect::from_xywh(
            hx as f32 - HANDLE_SIZE / 2.0,
            hy as f32 - HANDLE_SIZE / 2.0,
            HANDLE_SIZE,
            HANDLE_SIZE,
        );
        if let Some(h) = handle {
            surface.fill_path(&PathBuilder::from_rect(h), selection_color());
        }
    }
}

//! Built-in page layout and page assembly.
//!
//! [`build_page_shapes`] is the one path from a (template, recipe) pair to
//! a bound shape set. The editor, single-recipe preview and batch assembly
//! all call it.

use crate::assets::BindingAssets;
use crate::binding::{apply_bindings, bind, BindingTag};
use crate::model::{Color, DesignText, Point, Shape, ShapeKind};
use crate::renderer::{PAGE_HEIGHT, PAGE_WIDTH};
use crate::serialization::{restore_shapes, TemplateDocument};
use recipekit_core::Recipe;

const MARGIN: f64 = 36.0;
const INK: Color = Color::rgb(0x2c, 0x3e, 0x50);

fn heading(id: &str, x: f64, y: f64, label: &str) -> Shape {
    Shape::new(id, x, y, ShapeKind::Text(DesignText::new(label, 16.0).bold())).with_fill(INK)
}

fn body(tag: BindingTag, x: f64, y: f64, width: f64) -> Shape {
    Shape::text(tag.as_str(), x, y, "", 12.0)
        .with_wrap_width(width)
        .with_fill(Color::BLACK)
}

/// Layout used when no template has been saved: one shape per binding tag,
/// section headings, a header rule and a page frame.
pub fn fallback_layout() -> Vec<Shape> {
    let page_w = PAGE_WIDTH as f64;
    let page_h = PAGE_HEIGHT as f64;
    let content_w = page_w - 2.0 * MARGIN;
    let left_w = 240.0;
    let right_x = MARGIN + left_w + 24.0;
    let right_w = page_w - MARGIN - right_x;
    let half_w = content_w / 2.0 - 12.0;
    let footer_y = page_h - 112.0;

    vec![
        Shape::rectangle("frame", 12.0, 12.0, page_w - 24.0, page_h - 24.0).with_stroke(INK, 2.0),
        Shape::image(BindingTag::Watermark.as_str(), (page_w - 300.0) / 2.0, (page_h - 300.0) / 2.0, 300.0, 300.0),
        Shape::new(
            BindingTag::Title.as_str(),
            MARGIN,
            28.0,
            ShapeKind::Text(DesignText::new("", 28.0).bold()),
        )
        .with_wrap_width(content_w)
        .with_fill(INK),
        Shape::line(
            "header-rule",
            MARGIN,
            72.0,
            vec![Point::new(0.0, 0.0), Point::new(content_w, 0.0)],
        )
        .with_stroke(INK, 2.0),
        Shape::image(BindingTag::RecipeImage.as_str(), MARGIN, 90.0, left_w, 180.0),
        heading("ingredients-heading", MARGIN, 290.0, "Ingredients"),
        body(BindingTag::IngredientsContent, MARGIN, 314.0, left_w),
        heading("steps-heading", right_x, 90.0, "Method"),
        body(BindingTag::StepsContent, right_x, 114.0, right_w),
        heading("plating-guide-heading", right_x, 330.0, "Plating Guide"),
        body(BindingTag::PlatingGuideContent, right_x, 354.0, right_w),
        heading("allergens-heading", MARGIN, footer_y, "Allergens"),
        body(BindingTag::AllergensContent, MARGIN, footer_y + 24.0, half_w),
        heading("service-types-heading", MARGIN + half_w + 24.0, footer_y, "Service"),
        body(
            BindingTag::ServiceTypesContent,
            MARGIN + half_w + 24.0,
            footer_y + 24.0,
            half_w,
        ),
    ]
}

/// Fallback layout bound to `recipe`.
pub fn populate(recipe: &Recipe, assets: &BindingAssets) -> Vec<Shape> {
    let mut shapes = fallback_layout();
    apply_bindings(&mut shapes, &bind(recipe, assets));
    shapes
}

/// Bound shapes for one page: the template's shapes when it has any
/// usable ones, else the fallback layout.
pub fn build_page_shapes(
    template: Option<&TemplateDocument>,
    recipe: &Recipe,
    assets: &BindingAssets,
) -> Vec<Shape> {
    let mut shapes = match template.map(restore_shapes) {
        Some(shapes) if !shapes.is_empty() => shapes,
        Some(_) => {
            tracing::warn!(recipe_id = %recipe.id, "Template has no usable shapes; using fallback layout");
            fallback_layout()
        }
        None => fallback_layout(),
    };
    apply_bindings(&mut shapes, &bind(recipe, assets));
    shapes
}

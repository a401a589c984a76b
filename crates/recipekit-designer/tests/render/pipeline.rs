use image::{Rgba, RgbaImage};
use recipekit_core::{Recipe, RenderError};
use recipekit_designer::{
    populate, Bitmap, BindingAssets, Color, DesignImage, GuideOverlay, Point, RenderPipeline,
    Shape, ShapeKind, PAGE_HEIGHT, PAGE_WIDTH,
};
use std::collections::BTreeSet;

const WHITE: [u8; 4] = [255, 255, 255, 255];

fn filled(id: &str, x: f64, y: f64, color: Color) -> Shape {
    Shape::rectangle(id, x, y, 40.0, 40.0).with_fill(color)
}

#[test]
fn test_raster_is_fixed_page_size() {
    let raster = RenderPipeline::default().rasterize(&[]).unwrap();
    assert_eq!((raster.width(), raster.height()), (792, 612));
    assert_eq!((PAGE_WIDTH, PAGE_HEIGHT), (792, 612));
    assert_eq!(raster.pixel(0, 0), WHITE);
}

#[test]
fn test_shapes_drawn_in_render_order() {
    let red = Color::rgb(255, 0, 0);
    let blue = Color::rgb(0, 0, 255);
    let pipeline = RenderPipeline::default();

    let raster = pipeline
        .rasterize(&[filled("a", 0.0, 0.0, red), filled("b", 20.0, 20.0, blue)])
        .unwrap();
    assert_eq!(raster.pixel(30, 30), [0, 0, 255, 255]);
    assert_eq!(raster.pixel(10, 10), [255, 0, 0, 255]);

    let raster = pipeline
        .rasterize(&[filled("b", 20.0, 20.0, blue), filled("a", 0.0, 0.0, red)])
        .unwrap();
    assert_eq!(raster.pixel(30, 30), [255, 0, 0, 255]);
}

#[test]
fn test_export_hides_guides_and_restores_them() {
    let pipeline = RenderPipeline::default();
    let mut guides = GuideOverlay::new(true, 20.0);

    let view = pipeline.render_view(&[], &guides, &BTreeSet::new()).unwrap();
    assert!((18..=22).any(|x| view.pixel(x, 5) != WHITE));

    let exported = pipeline.export(&[], &mut guides).unwrap();
    assert!(exported.as_image().pixels().all(|p| p.0 == WHITE));
    assert!(guides.is_visible());
}

#[test]
fn test_guides_restored_after_failed_export() {
    let pipeline = RenderPipeline::default();
    let mut guides = GuideOverlay::new(true, 20.0);
    let tainted = Shape::new(
        "pic",
        10.0,
        10.0,
        ShapeKind::Image(
            DesignImage::new(20.0, 20.0)
                .with_bitmap(Bitmap::foreign(RgbaImage::new(1, 1), "https://elsewhere/x.png")),
        ),
    );

    let err = pipeline.export(&[tainted], &mut guides).unwrap_err();
    assert_eq!(
        err,
        RenderError::TaintedSurface {
            source_path: "https://elsewhere/x.png".to_string()
        }
    );
    assert!(guides.is_visible());
}

#[test]
fn test_selection_outline_only_in_view() {
    let pipeline = RenderPipeline::default();
    let shape = Shape::rectangle("box", 100.0, 100.0, 50.0, 50.0).with_fill(Color::WHITE);
    let guides = GuideOverlay::new(false, 20.0);

    let plain = pipeline
        .render_view(std::slice::from_ref(&shape), &guides, &BTreeSet::new())
        .unwrap();
    let selected = pipeline
        .render_view(
            std::slice::from_ref(&shape),
            &guides,
            &BTreeSet::from(["box".to_string()]),
        )
        .unwrap();
    assert_ne!(plain, selected);
}

#[test]
fn test_local_bitmap_is_scaled_into_frame() {
    let green = Bitmap::local(RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])));
    let shape = Shape::new(
        "photo",
        100.0,
        100.0,
        ShapeKind::Image(DesignImage::new(60.0, 60.0).with_bitmap(green)),
    );
    let raster = RenderPipeline::default().rasterize(&[shape]).unwrap();
    let [r, g, b, _] = raster.pixel(130, 130);
    assert!(g > 200 && r < 50 && b < 50);
    assert_eq!(raster.pixel(170, 170), WHITE);
}

#[test]
fn test_line_strokes_between_points() {
    let line = Shape::line(
        "rule",
        10.0,
        50.0,
        vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0)],
    )
    .with_stroke(Color::BLACK, 4.0);
    let raster = RenderPipeline::default().rasterize(&[line]).unwrap();
    assert_eq!(raster.pixel(100, 50), [0, 0, 0, 255]);
    assert_eq!(raster.pixel(100, 60), WHITE);
}

#[test]
fn test_populated_page_renders_with_placeholders() {
    let shapes = populate(&Recipe::new("1", "Risotto"), &BindingAssets::placeholders());
    let raster = RenderPipeline::default().rasterize(&shapes).unwrap();
    assert_eq!((raster.width(), raster.height()), (PAGE_WIDTH, PAGE_HEIGHT));
    let png = raster.to_png().unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn test_custom_background() {
    let pipeline = RenderPipeline::new(100, 50).with_background(Color::rgb(10, 20, 30));
    let raster = pipeline.rasterize(&[]).unwrap();
    assert_eq!((raster.width(), raster.height()), (100, 50));
    assert_eq!(raster.pixel(99, 49), [10, 20, 30, 255]);
}

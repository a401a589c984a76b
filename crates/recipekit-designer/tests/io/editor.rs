use image::RgbaImage;
use recipekit_core::Recipe;
use recipekit_designer::{
    fallback_layout, serialize, AssetLoader, Bitmap, BindingAssets, DesignImage, FileTemplateStore,
    GridSnap, MemoryBitmapSource, MemoryTemplateStore, Point, PointerOutcome, RenderPipeline, Shape,
    ShapeKind, ShapePatch, TemplateEditor, TemplateName, TemplateStore, Tool, PAGE_HEIGHT, PAGE_WIDTH,
};
use std::sync::Arc;

fn recipe() -> Recipe {
    Recipe::new("5", "Bouillabaisse").with_steps("Simmer the fish")
}

fn text_of<'a>(editor: &'a TemplateEditor, id: &str) -> Option<&'a str> {
    editor.store().get(id).and_then(|s| s.text_content())
}

fn foreign_picture() -> Shape {
    Shape::new(
        "pic",
        0.0,
        0.0,
        ShapeKind::Image(
            DesignImage::new(50.0, 50.0)
                .with_bitmap(Bitmap::foreign(RgbaImage::new(2, 2), "https://other.example/p.png")),
        ),
    )
}

#[test]
fn test_populate_binds_fallback_layout() {
    let mut editor = TemplateEditor::default();
    editor.populate(&recipe(), &BindingAssets::placeholders());
    assert_eq!(editor.shapes().len(), fallback_layout().len());
    assert_eq!(text_of(&editor, "title"), Some("Bouillabaisse"));
    assert_eq!(text_of(&editor, "steps-content"), Some("Simmer the fish"));
}

#[test]
fn test_stale_load_is_discarded() {
    let mut editor = TemplateEditor::default();
    let assets = BindingAssets::placeholders();
    let older = serialize(&[Shape::rectangle("old", 0.0, 0.0, 5.0, 5.0)]);
    let newer = serialize(&[Shape::rectangle("new", 0.0, 0.0, 5.0, 5.0)]);

    let first = editor.begin_load();
    let second = editor.begin_load();
    assert!(editor.apply_loaded(second, Some(&newer), &recipe(), &assets));
    assert!(!editor.apply_loaded(first, Some(&older), &recipe(), &assets));
    assert!(editor.store().contains("new"));
    assert!(!editor.store().contains("old"));
}

#[test]
fn test_navigation_cancels_pending_load() {
    let mut editor = TemplateEditor::default();
    let token = editor.begin_load();
    editor.cancel_pending();
    let doc = serialize(&[Shape::rectangle("late", 0.0, 0.0, 5.0, 5.0)]);
    assert!(!editor.apply_loaded(token, Some(&doc), &recipe(), &BindingAssets::placeholders()));
    assert!(editor.store().is_empty());
}

#[test]
fn test_absent_template_loads_fallback() {
    let mut editor = TemplateEditor::default();
    let token = editor.begin_load();
    assert!(editor.apply_loaded(token, None, &recipe(), &BindingAssets::placeholders()));
    assert_eq!(editor.shapes().len(), fallback_layout().len());
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let store = MemoryTemplateStore::new();
    let loader = AssetLoader::new(Arc::new(MemoryBitmapSource::new()));

    let mut editor = TemplateEditor::default();
    editor.populate(&recipe(), &BindingAssets::placeholders());
    editor.add_shape(Shape::text("motto", 20.0, 580.0, "Fresh daily", 10.0)).unwrap();
    editor.save(&store, &TemplateName::Default).await.unwrap();

    let saved = store.load(&TemplateName::Default).await.unwrap().unwrap();
    assert!(saved.modified.is_some());

    let other = Recipe::new("6", "Cassoulet");
    let mut fresh = TemplateEditor::default();
    assert!(fresh.load(&store, &loader, &other).await);
    assert_eq!(text_of(&fresh, "title"), Some("Cassoulet"));
    assert_eq!(text_of(&fresh, "motto"), Some("Fresh daily"));
    assert!(fresh.active_notices().is_empty());
}

#[tokio::test]
async fn test_failed_save_raises_dismissible_notice() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let store = FileTemplateStore::new(blocker.join("templates"));

    let mut editor = TemplateEditor::default();
    editor.add_shape(Shape::rectangle("a", 0.0, 0.0, 5.0, 5.0)).unwrap();
    assert!(editor.save(&store, &TemplateName::Default).await.is_err());

    let notices = editor.active_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind_label, "Storage");
    assert!(notices[0].message.contains("default"));

    assert!(editor.dismiss(0));
    assert!(editor.active_notices().is_empty());
    assert_eq!(editor.notices().len(), 1);
    assert!(!editor.dismiss(3));
}

#[test]
fn test_export_png_is_page_sized() {
    let mut editor = TemplateEditor::default();
    editor.add_shape(Shape::rectangle("a", 10.0, 10.0, 50.0, 50.0)).unwrap();
    let png = editor.export_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (PAGE_WIDTH, PAGE_HEIGHT));
    assert!(editor.guides().is_visible());
}

#[test]
fn test_tainted_export_fails_with_render_notice() {
    let mut editor = TemplateEditor::default();
    editor.add_shape(foreign_picture()).unwrap();

    let err = editor.export_png().unwrap_err();
    assert!(err.is_render_error());
    assert_eq!(editor.active_notices()[0].kind_label, "Render");
    // Guides come back after the failed export, and the view still renders.
    assert!(editor.guides().is_visible());
    assert!(editor.render_view().is_ok());
}

#[test]
fn test_preview_binds_without_touching_session() {
    let mut editor = TemplateEditor::default();
    editor.add_shape(Shape::text("title", 0.0, 0.0, "Draft", 12.0)).unwrap();
    let raster = editor
        .preview(&Recipe::new("8", "Paella"), &BindingAssets::placeholders())
        .unwrap();
    assert_eq!((raster.width(), raster.height()), (PAGE_WIDTH, PAGE_HEIGHT));
    assert_eq!(text_of(&editor, "title"), Some("Draft"));
}

#[test]
fn test_interactive_editing_never_notifies() {
    let mut editor = TemplateEditor::new(RenderPipeline::default(), GridSnap::new(true, 20.0));
    editor.set_tool(Tool::Rectangle);
    let created = editor.pointer_down(Point::new(41.0, 59.0), false);
    let PointerOutcome::Created(id) = created else {
        panic!("expected creation, got {created:?}");
    };
    assert_eq!(editor.store().get(&id).unwrap().position(), Point::new(40.0, 60.0));

    editor.set_tool(Tool::Select);
    assert_eq!(
        editor.pointer_down(Point::new(50.0, 70.0), false),
        PointerOutcome::Selected(id.clone())
    );
    assert!(editor.begin_drag(&id));
    editor.drag_to(Point::new(63.0, 78.0));
    assert_eq!(editor.end_drag(), Some(Point::new(60.0, 80.0)));
    assert!(!editor.is_dragging());

    assert_eq!(editor.apply_to_selected(&ShapePatch::new().opacity(0.3)), 1);
    assert!(editor.update_shape("missing", &ShapePatch::new()).is_err());
    assert_eq!(editor.delete_selected(), 1);
    assert!(editor.notices().is_empty());
}

#[test]
fn test_escape_cancels_active_drag() {
    let mut editor = TemplateEditor::default();
    editor.add_shape(Shape::circle("c", 100.0, 100.0, 10.0)).unwrap();
    assert!(editor.begin_drag("c"));
    editor.drag_to(Point::new(300.0, 300.0));
    editor.escape();
    assert_eq!(editor.store().get("c").unwrap().position(), Point::new(100.0, 100.0));
    assert_eq!(editor.selection().selected_count(), 0);
}

#[test]
fn test_clear_all_empties_store_and_selection() {
    let mut editor = TemplateEditor::default();
    editor.populate(&recipe(), &BindingAssets::placeholders());
    editor.select_all();
    editor.clear_all();
    assert!(editor.store().is_empty());
    assert_eq!(editor.selection().selected_count(), 0);
}

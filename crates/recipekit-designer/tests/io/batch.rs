use image::{Rgba, RgbaImage};
use recipekit_core::{Recipe, RenderError};
use recipekit_designer::{
    AssetLoader, BatchDocumentAssembler, Bitmap, Color, MemoryBitmapSource, MemoryTemplateStore,
    RenderPipeline, Shape, TemplateName, TemplateStore, PAGE_HEIGHT, PAGE_WIDTH,
};
use std::sync::Arc;

fn recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("R1", "Consomme").with_image("local.png"),
        Recipe::new("R2", "Tartare").with_image("elsewhere.png"),
        Recipe::new("R3", "Souffle"),
    ]
}

fn sources() -> MemoryBitmapSource {
    let source = MemoryBitmapSource::new();
    source.insert(
        "local.png",
        Bitmap::local(RgbaImage::from_pixel(4, 4, Rgba([200, 30, 30, 255]))),
    );
    source
}

fn assembler(templates: MemoryTemplateStore, bitmaps: MemoryBitmapSource) -> BatchDocumentAssembler {
    BatchDocumentAssembler::new(
        Arc::new(templates),
        AssetLoader::new(Arc::new(bitmaps)),
        RenderPipeline::default(),
    )
}

#[tokio::test]
async fn test_one_page_per_recipe_in_input_order() {
    let batch = assembler(MemoryTemplateStore::new(), sources());
    let doc = batch.generate(&recipes()).await.unwrap();

    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.recipe_ids(), vec!["R1", "R2", "R3"]);
    for page in &doc.pages {
        assert_eq!((page.raster.width(), page.raster.height()), (PAGE_WIDTH, PAGE_HEIGHT));
    }

    let pdf = doc.to_pdf();
    let marker = b"/Type /Page ";
    let pages = pdf.windows(marker.len()).filter(|w| *w == marker).count();
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn test_foreign_image_aborts_whole_batch_at_that_recipe() {
    let bitmaps = sources();
    bitmaps.insert(
        "elsewhere.png",
        Bitmap::foreign(RgbaImage::new(2, 2), "https://cdn.example.net/tartare.png"),
    );
    let batch = assembler(MemoryTemplateStore::new(), bitmaps);

    let err = batch.generate(&recipes()).await.unwrap_err();
    assert_eq!(err.recipe_id, "R2");
    assert_eq!(err.index, 1);
    assert!(matches!(err.source, RenderError::TaintedSurface { .. }));
    assert!(err.to_string().contains("R2"));
}

#[tokio::test]
async fn test_stored_default_template_is_used() {
    let templates = MemoryTemplateStore::new();
    let layout = vec![
        Shape::rectangle("band", 0.0, 0.0, 792.0, 40.0).with_fill(Color::rgb(0, 0, 255)),
        Shape::text("title", 10.0, 50.0, "", 20.0),
    ];
    templates
        .save(recipekit_designer::SaveTemplateRequest::new(
            &TemplateName::Default,
            recipekit_designer::serialize(&layout),
        ))
        .await
        .unwrap();
    let batch = assembler(templates, sources());

    let doc = batch.generate(&recipes()[..1]).await.unwrap();
    let raster = &doc.pages[0].raster;
    assert_eq!(raster.pixel(400, 20), [0, 0, 255, 255]);
    // Below the band the page is the white background: the fallback frame
    // is not drawn.
    assert_eq!(raster.pixel(14, 300), [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_preview_uses_recipe_override() {
    let templates = MemoryTemplateStore::new()
        .with_template(
            &TemplateName::Default,
            recipekit_designer::serialize(&[Shape::rectangle("g", 0.0, 0.0, 10.0, 10.0)
                .with_fill(Color::rgb(0, 255, 0))]),
        )
        .with_template(
            &TemplateName::for_recipe("R3"),
            recipekit_designer::serialize(&[Shape::rectangle("r", 0.0, 0.0, 10.0, 10.0)
                .with_fill(Color::rgb(255, 0, 0))]),
        );
    let batch = assembler(templates, sources());

    let special = batch.preview(&recipes()[2]).await.unwrap();
    assert_eq!(special.pixel(5, 5), [255, 0, 0, 255]);
    let plain = batch.preview(&recipes()[0]).await.unwrap();
    assert_eq!(plain.pixel(5, 5), [0, 255, 0, 255]);
}

#[tokio::test]
async fn test_empty_input_gives_empty_document() {
    let batch = assembler(MemoryTemplateStore::new(), sources());
    let doc = batch.generate(&[]).await.unwrap();
    assert!(doc.is_empty());
}

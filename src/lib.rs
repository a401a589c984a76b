//! # RecipeKit
//!
//! Recipe card template designer and batch page renderer for restaurant
//! kitchens.
//!
//! ## Architecture
//!
//! RecipeKit is organized as a workspace with multiple crates:
//!
//! 1. **recipekit-core** - Recipe records, error taxonomy, request tokens
//! 2. **recipekit-designer** - Shapes, selection, binding, serialization, rendering, batch output
//! 3. **recipekit-settings** - Configuration files and validation
//! 4. **recipekit** - Command-line binary wiring the crates together
//!
//! ## Features
//!
//! - **Template Editing**: Shape store, click/drag selection, grid snapping
//! - **Field Binding**: One binder for population, rehydration and preview
//! - **Rendering**: Fixed-size pages, guide-free export, PNG and PDF output
//! - **Batch Output**: One page per recipe, aborted as a whole on failure

use std::sync::Arc;

use recipekit_designer::{
    AssetLoader, BatchDocumentAssembler, Color, FileTemplateStore, FsBitmapSource, GridSnap,
    RenderPipeline, TemplateEditor,
};

pub use recipekit_core as core;
pub use recipekit_designer as designer;
pub use recipekit_settings as settings;

pub use recipekit_core::{
    BatchAbortError, Error, Ingredient, JsonRecipeSource, Recipe, RecipeSource, RenderError,
    ResourceLoadError, Result, ShapeValidationError, StorageError,
};
pub use recipekit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Page pipeline sized and colored from the configuration.
pub fn render_pipeline(config: &Config) -> RenderPipeline {
    let background = Color::parse_hex(&config.export.background).unwrap_or_else(|| {
        tracing::warn!(value = %config.export.background, "Unreadable background color, using white");
        Color::WHITE
    });
    RenderPipeline::new(config.page.width, config.page.height).with_background(background)
}

/// Bitmap loading with the configured placeholder, logo and watermark opacity.
pub fn asset_loader(config: &Config) -> AssetLoader {
    let mut loader = AssetLoader::new(Arc::new(FsBitmapSource::new(&config.assets.root)))
        .with_watermark_opacity(config.assets.watermark_opacity);
    if let Some(placeholder) = &config.assets.placeholder_image {
        loader = loader.with_placeholder(placeholder);
    }
    if let Some(logo) = &config.assets.logo_image {
        loader = loader.with_logo(logo);
    }
    loader
}

pub fn template_store(config: &Config) -> FileTemplateStore {
    FileTemplateStore::new(&config.storage.template_dir)
}

pub fn grid_snap(config: &Config) -> GridSnap {
    GridSnap::new(config.grid.snap_enabled, config.grid.size)
}

/// Editing session configured from `config`.
pub fn editor(config: &Config) -> TemplateEditor {
    let mut editor = TemplateEditor::new(render_pipeline(config), grid_snap(config));
    editor.set_guides_visible(config.grid.show_guides);
    editor
}

/// Batch assembler over the file template store and the asset root.
pub fn batch_assembler(config: &Config) -> BatchDocumentAssembler {
    BatchDocumentAssembler::new(
        Arc::new(template_store(config)),
        asset_loader(config),
        render_pipeline(config),
    )
}

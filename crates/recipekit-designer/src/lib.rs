//! # RecipeKit Designer
//!
//! Visual template designer and page rendering pipeline for recipe cards.
//! A template is a list of positioned shapes; shapes carrying a binding tag
//! are filled from a recipe record when a page is built, so one layout
//! serves every recipe.
//!
//! ## Core Components
//!
//! - **Model**: rectangles, circles, lines, text and images behind one
//!   [`Shape`] type
//! - **Shape Store**: the ordered, id-unique shape list of a session
//! - **Selection**: click, additive click, group drag and tool creation
//! - **Binding**: recipe fields to tagged shapes, with fallbacks
//! - **Serialization**: storage-safe template documents
//! - **Rendering**: tiny-skia surfaces, guide overlay, PNG export
//! - **Batch**: one page per recipe, assembled into a PDF
//!
//! ## Architecture
//!
//! ```text
//! TemplateEditor (interactive session)
//!   ├── ShapeStore + SelectionController + GridSnap
//!   ├── TemplateStore (load / save by name)
//!   └── RenderPipeline (view, preview, export)
//!
//! BatchDocumentAssembler
//!   ├── TemplateStore + AssetLoader
//!   └── build_page_shapes -> RenderPipeline -> PageDocument
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recipekit_designer::{BindingAssets, RenderPipeline, build_page_shapes};
//!
//! let shapes = build_page_shapes(None, &recipe, &BindingAssets::placeholders());
//! let png = RenderPipeline::default().rasterize(&shapes)?.to_png()?;
//! ```

pub mod assets;
pub mod batch;
pub mod binding;
pub mod document;
pub mod editor;
pub mod font_manager;
pub mod grid;
pub mod layout;
pub mod model;
pub mod renderer;
pub mod selection_manager;
pub mod serialization;
pub mod shape_store;
pub mod template_store;

pub use assets::{
    AssetLoader, Bitmap, BitmapOrigin, BitmapSource, BindingAssets, FsBitmapSource,
    MemoryBitmapSource, DEFAULT_WATERMARK_OPACITY,
};
pub use batch::BatchDocumentAssembler;
pub use binding::{apply_bindings, bind, BindingTag, BoundFields, BoundValue};
pub use document::{Page, PageDocument};
pub use editor::{Notice, TemplateEditor};
pub use grid::{snap, GridSnap};
pub use layout::{build_page_shapes, fallback_layout, populate};
pub use model::{
    Color, DesignCircle, DesignImage, DesignLine, DesignRectangle, DesignText, DesignerShape,
    Paint, Point, Shape, ShapeKind, ShapePatch, ShapeType, Style,
};
pub use renderer::{
    GuideOverlay, Raster, RenderPipeline, Surface, PAGE_HEIGHT, PAGE_WIDTH,
};
pub use selection_manager::{DragSession, PointerOutcome, SelectionController, Tool};
pub use serialization::{
    deserialize, restore_shapes, serialize, ShapeRecord, TemplateDocument, FORMAT_VERSION,
};
pub use shape_store::{ShapeStore, StoreError};
pub use template_store::{
    resolve_template, FileTemplateStore, MemoryTemplateStore, SaveTemplateRequest,
    TemplateName, TemplateStore,
};

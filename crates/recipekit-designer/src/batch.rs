//! Multi-page batch assembly.
//!
//! Pages are rendered strictly one after another in input order. Each page
//! gets its own rasterization surface, and the first failure discards the
//! whole batch.

use std::sync::Arc;

use recipekit_core::{BatchAbortError, Recipe, RenderError};

use crate::assets::AssetLoader;
use crate::document::PageDocument;
use crate::layout::build_page_shapes;
use crate::renderer::{Raster, RenderPipeline};
use crate::serialization::TemplateDocument;
use crate::template_store::{load_or_none, resolve_template, TemplateName, TemplateStore};

/// Drives field binding and rendering once per recipe.
#[derive(Clone)]
pub struct BatchDocumentAssembler {
    templates: Arc<dyn TemplateStore>,
    assets: AssetLoader,
    pipeline: RenderPipeline,
}

impl BatchDocumentAssembler {
    pub fn new(templates: Arc<dyn TemplateStore>, assets: AssetLoader, pipeline: RenderPipeline) -> Self {
        Self {
            templates,
            assets,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    async fn render_page(&self, template: Option<&TemplateDocument>, recipe: &Recipe) -> Result<Raster, RenderError> {
        let assets = self.assets.assets_for(recipe).await;
        let shapes = build_page_shapes(template, recipe, &assets);
        self.pipeline.rasterize(&shapes)
    }

    /// Renders one page per recipe, in input order, from the default
    /// template (or the fallback layout when none is stored).
    ///
    /// # Errors
    ///
    /// [`BatchAbortError`] naming the first recipe whose page failed. No
    /// partial document is returned.
    pub async fn generate(&self, recipes: &[Recipe]) -> Result<PageDocument, BatchAbortError> {
        let template = load_or_none(self.templates.as_ref(), &TemplateName::Default).await;
        tracing::info!(
            recipes = recipes.len(),
            template = template.is_some(),
            "Assembling batch document"
        );

        let mut document = PageDocument::new();
        for (index, recipe) in recipes.iter().enumerate() {
            match self.render_page(template.as_ref(), recipe).await {
                Ok(raster) => document.push(recipe.id.clone(), raster),
                Err(source) => {
                    tracing::warn!(recipe_id = %recipe.id, index, error = %source, "Batch aborted");
                    return Err(BatchAbortError {
                        recipe_id: recipe.id.clone(),
                        index,
                        source,
                    });
                }
            }
        }
        tracing::info!(pages = document.page_count(), "Batch document complete");
        Ok(document)
    }

    /// Single-recipe page using the recipe's override template if stored.
    pub async fn preview(&self, recipe: &Recipe) -> Result<Raster, RenderError> {
        let template = resolve_template(self.templates.as_ref(), &recipe.id).await;
        self.render_page(template.as_ref(), recipe).await
    }
}

//! Interactive template editing session.
//!
//! A [`TemplateEditor`] owns the shape store exclusively. Pointer input,
//! drags and property edits are plain synchronous calls; only loading a
//! stored template and its bitmaps suspends, and those results are applied
//! through request tokens so a slow, superseded load never overwrites a
//! newer one.
//!
//! Interactive operations never raise notices. Explicit save, preview and
//! export failures are returned to the caller and also pushed onto the
//! notice list as dismissible, kind-labelled messages.

use recipekit_core::{Error, Recipe, RequestToken, RequestTracker};

use crate::assets::{AssetLoader, BindingAssets};
use crate::grid::GridSnap;
use crate::layout::{build_page_shapes, populate};
use crate::model::{Point, Shape, ShapePatch};
use crate::renderer::{GuideOverlay, Raster, RenderPipeline};
use crate::selection_manager::{DragSession, PointerOutcome, SelectionController, Tool};
use crate::serialization::{serialize, TemplateDocument};
use crate::shape_store::{ShapeStore, StoreError};
use crate::template_store::{resolve_template, SaveTemplateRequest, TemplateName, TemplateStore};

/// User-facing failure message for an explicit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind_label: &'static str,
    pub message: String,
    pub dismissed: bool,
}

impl Notice {
    pub fn from_error(error: &Error) -> Self {
        Self {
            kind_label: error.kind_label(),
            message: error.to_string(),
            dismissed: false,
        }
    }
}

pub struct TemplateEditor {
    store: ShapeStore,
    selection: SelectionController,
    grid: GridSnap,
    guides: GuideOverlay,
    pipeline: RenderPipeline,
    requests: RequestTracker,
    notices: Vec<Notice>,
    drag: Option<DragSession>,
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::new(RenderPipeline::default(), GridSnap::default())
    }
}

impl TemplateEditor {
    pub fn new(pipeline: RenderPipeline, grid: GridSnap) -> Self {
        Self {
            store: ShapeStore::new(),
            selection: SelectionController::new(),
            guides: GuideOverlay::new(true, grid.size),
            grid,
            pipeline,
            requests: RequestTracker::new(),
            notices: Vec::new(),
            drag: None,
        }
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn shapes(&self) -> &[Shape] {
        self.store.list()
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn grid(&self) -> GridSnap {
        self.grid
    }

    pub fn set_grid(&mut self, grid: GridSnap) {
        self.grid = grid;
        self.guides.set_spacing(grid.size);
    }

    pub fn guides(&self) -> &GuideOverlay {
        &self.guides
    }

    pub fn set_guides_visible(&mut self, visible: bool) {
        self.guides.set_visible(visible);
    }

    pub fn tool(&self) -> Tool {
        self.selection.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.selection.set_tool(tool);
    }

    // Interactive operations

    pub fn pointer_down(&mut self, point: Point, additive: bool) -> PointerOutcome {
        self.selection
            .pointer_down(&mut self.store, point, additive, &self.grid)
    }

    pub fn click(&mut self, id: &str, additive: bool) {
        self.selection.click(id, additive);
    }

    pub fn click_empty(&mut self, point: Point) -> Option<String> {
        self.selection.click_empty(&mut self.store, point, &self.grid)
    }

    pub fn escape(&mut self) {
        if let Some(drag) = self.drag.take() {
            drag.cancel(&mut self.store);
        }
        self.selection.escape();
    }

    pub fn add_shape(&mut self, shape: Shape) -> Result<(), StoreError> {
        self.store.add(shape)
    }

    pub fn update_shape(&mut self, id: &str, patch: &ShapePatch) -> Result<(), StoreError> {
        self.store.update(id, patch)
    }

    pub fn apply_to_selected(&mut self, patch: &ShapePatch) -> usize {
        self.selection.apply_to_selected(&mut self.store, patch)
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.store);
    }

    pub fn delete_selected(&mut self) -> usize {
        self.selection.delete_selected(&mut self.store)
    }

    pub fn bring_to_front(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.bring_to_front(id)
    }

    pub fn send_to_back(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.send_to_back(id)
    }

    /// Removes every shape.
    pub fn clear_all(&mut self) {
        self.drag = None;
        self.store.clear();
        self.selection.clear();
    }

    /// Starts dragging `id` (and the rest of the selection). Returns false
    /// if the shape does not exist.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        self.drag = self.selection.begin_drag(&self.store, id);
        self.drag.is_some()
    }

    pub fn drag_to(&mut self, point: Point) {
        if let Some(drag) = self.drag.as_mut() {
            drag.drag_to(&mut self.store, point);
        }
    }

    /// Ends the active drag, snapping the group if enabled. Returns the
    /// dragged shape's final position.
    pub fn end_drag(&mut self) -> Option<Point> {
        let drag = self.drag.take()?;
        Some(drag.finish(&mut self.store, &self.grid))
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // Population and loading

    /// Fills the page with the fallback layout bound to `recipe`.
    pub fn populate(&mut self, recipe: &Recipe, assets: &BindingAssets) {
        self.requests.invalidate();
        self.replace_shapes(populate(recipe, assets));
        tracing::debug!(recipe_id = %recipe.id, shapes = self.store.len(), "Populated fallback layout");
    }

    /// Starts a template load. Any load begun earlier becomes stale.
    pub fn begin_load(&self) -> RequestToken {
        self.requests.begin()
    }

    /// Drops every outstanding load, e.g. when navigating away.
    pub fn cancel_pending(&self) {
        self.requests.invalidate();
    }

    /// Applies a finished load if `token` is still the latest request.
    /// `None` for `document` means nothing was stored and the fallback
    /// layout is used. Returns false when the result was stale and ignored.
    pub fn apply_loaded(
        &mut self,
        token: RequestToken,
        document: Option<&TemplateDocument>,
        recipe: &Recipe,
        assets: &BindingAssets,
    ) -> bool {
        if !self.requests.is_current(token) {
            tracing::debug!(token = token.value(), recipe_id = %recipe.id, "Discarding stale template load");
            return false;
        }
        self.replace_shapes(build_page_shapes(document, recipe, assets));
        true
    }

    /// Loads the template for `recipe` (override, default, else fallback)
    /// and its bitmaps, then applies the result unless superseded.
    pub async fn load(&mut self, templates: &dyn TemplateStore, loader: &AssetLoader, recipe: &Recipe) -> bool {
        let token = self.begin_load();
        let document = resolve_template(templates, &recipe.id).await;
        let assets = loader.assets_for(recipe).await;
        self.apply_loaded(token, document.as_ref(), recipe, &assets)
    }

    fn replace_shapes(&mut self, shapes: Vec<Shape>) {
        self.drag = None;
        if let Err(e) = self.store.replace_all(shapes) {
            tracing::warn!(error = %e, "Loaded layout rejected");
            return;
        }
        self.selection.retain_existing(&self.store);
    }

    // Explicit actions

    /// Current layout as a storage-safe document.
    pub fn to_document(&self) -> TemplateDocument {
        serialize(self.store.list())
    }

    /// Saves the current layout under `name`, replacing any stored version.
    pub async fn save(&mut self, templates: &dyn TemplateStore, name: &TemplateName) -> Result<(), Error> {
        let mut document = self.to_document();
        document.touch();
        match templates.save(SaveTemplateRequest::new(name, document)).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.notify(e.into())),
        }
    }

    /// Renders the current layout bound to `recipe`, guides hidden.
    pub fn preview(&mut self, recipe: &Recipe, assets: &BindingAssets) -> Result<Raster, Error> {
        let document = self.to_document();
        let shapes = build_page_shapes(Some(&document), recipe, assets);
        match self.pipeline.export(&shapes, &mut self.guides) {
            Ok(raster) => Ok(raster),
            Err(e) => Err(self.notify(e.into())),
        }
    }

    /// Exports the page exactly as laid out, without guides, as PNG bytes.
    pub fn export_png(&mut self) -> Result<Vec<u8>, Error> {
        let result = self
            .pipeline
            .export(self.store.list(), &mut self.guides)
            .and_then(|raster| raster.to_png());
        match result {
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(self.notify(e.into())),
        }
    }

    /// On-screen view with guides and selection indicators.
    pub fn render_view(&self) -> Result<Raster, Error> {
        Ok(self
            .pipeline
            .render_view(self.store.list(), &self.guides, self.selection.selected())?)
    }

    // Notices

    fn notify(&mut self, error: Error) -> Error {
        tracing::warn!(kind = error.kind_label(), error = %error, "Action failed");
        self.notices.push(Notice::from_error(&error));
        error
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn active_notices(&self) -> Vec<&Notice> {
        self.notices.iter().filter(|n| !n.dismissed).collect()
    }

    /// Marks the notice at `index` dismissed. Returns false if there is none.
    pub fn dismiss(&mut self, index: usize) -> bool {
        match self.notices.get_mut(index) {
            Some(notice) => {
                notice.dismissed = true;
                true
            }
            None => false,
        }
    }
}

use crate::grid::GridSnap;
use crate::model::{Point, Shape, ShapePatch, ShapeType};
use crate::shape_store::ShapeStore;
use std::collections::{BTreeSet, HashMap};

/// Hit-test slack in points for pointer clicks.
pub const DEFAULT_HIT_TOLERANCE: f64 = 3.0;

/// Active editor tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Select,
    Rectangle,
    Circle,
    Line,
    Text,
    Image,
}

impl Tool {
    /// The shape kind this tool places, or `None` for the select tool.
    pub fn shape_type(&self) -> Option<ShapeType> {
        match self {
            Tool::Select => None,
            Tool::Rectangle => Some(ShapeType::Rectangle),
            Tool::Circle => Some(ShapeType::Circle),
            Tool::Line => Some(ShapeType::Line),
            Tool::Text => Some(ShapeType::Text),
            Tool::Image => Some(ShapeType::Image),
        }
    }

    /// Default shape for this tool anchored at `at`.
    ///
    /// Rectangle 120x60, circle of radius 30, line 100 wide, "Text" at
    /// 16pt, image frame 120x90.
    pub fn default_shape(&self, id: impl Into<String>, at: Point) -> Option<Shape> {
        let shape = match self {
            Tool::Select => return None,
            Tool::Rectangle => Shape::rectangle(id, at.x, at.y, 120.0, 60.0),
            Tool::Circle => Shape::circle(id, at.x, at.y, 30.0),
            Tool::Line => Shape::line(
                id,
                at.x,
                at.y,
                vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            ),
            Tool::Text => Shape::text(id, at.x, at.y, "Text", 16.0),
            Tool::Image => Shape::image(id, at.x, at.y, 120.0, 90.0),
        };
        Some(shape)
    }
}

/// What a pointer press on the canvas did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// A shape was hit and the selection updated.
    Selected(String),
    /// Empty canvas with a placement tool: a new shape was added.
    Created(String),
    /// Empty canvas with the select tool: the selection was cleared.
    Cleared,
}

/// Tracks which shapes are selected and resolves pointer input.
///
/// `SelectionController` is responsible for:
/// - The set of selected shape ids
/// - Click and Shift+click selection semantics
/// - Creating shapes on empty-canvas clicks when a placement tool is active
/// - Starting group drags through [`DragSession`]
///
/// # Selection Model
///
/// - **Click**: replaces the selection with the clicked shape
/// - **Additive click**: toggles the clicked shape in or out of the selection
/// - **Empty click / Escape**: clears the selection (select tool only for clicks)
///
/// Selection is held as ids only; shapes themselves carry no selection flag.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: BTreeSet<String>,
    tool: Tool,
}

impl SelectionController {
    /// Creates a controller with nothing selected and the select tool active.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Ids of the selected shapes.
    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Handles a click on the shape with `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The clicked shape
    /// * `additive` - `true` for Shift+click: toggles membership without
    ///   touching the rest of the selection
    pub fn click(&mut self, id: &str, additive: bool) {
        if additive {
            if !self.selected.remove(id) {
                self.selected.insert(id.to_string());
            }
        } else {
            self.selected.clear();
            self.selected.insert(id.to_string());
        }
    }

    /// Handles a click on empty canvas at `point`.
    ///
    /// With the select tool active the selection is cleared. With a
    /// placement tool a default shape of that kind is added at the
    /// (optionally snapped) point and the selection is left as it was.
    ///
    /// # Returns
    ///
    /// The id of the created shape, if one was created.
    pub fn click_empty(&mut self, store: &mut ShapeStore, point: Point, grid: &GridSnap) -> Option<String> {
        let shape_type = match self.tool.shape_type() {
            Some(shape_type) => shape_type,
            None => {
                self.selected.clear();
                return None;
            }
        };
        let id = store.next_id(shape_type.as_str());
        let shape = self.tool.default_shape(id.clone(), grid.apply(point))?;
        match store.add(shape) {
            Ok(()) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not place new shape");
                None
            }
        }
    }

    /// Escape clears the selection unconditionally.
    pub fn escape(&mut self) {
        self.selected.clear();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Returns the topmost shape under `point`.
    ///
    /// Shapes are tested from the top of the render order down, so when
    /// shapes overlap the one drawn last wins.
    pub fn hit_test<'a>(&self, store: &'a ShapeStore, point: Point, tolerance: f64) -> Option<&'a Shape> {
        store
            .list()
            .iter()
            .rev()
            .find(|shape| shape.contains_point(point, tolerance))
    }

    /// Resolves a pointer press: a hit goes to [`click`](Self::click), a
    /// miss to [`click_empty`](Self::click_empty).
    pub fn pointer_down(
        &mut self,
        store: &mut ShapeStore,
        point: Point,
        additive: bool,
        grid: &GridSnap,
    ) -> PointerOutcome {
        let hit = self
            .hit_test(store, point, DEFAULT_HIT_TOLERANCE)
            .map(|s| s.id.clone());
        if let Some(id) = hit {
            self.click(&id, additive);
            return PointerOutcome::Selected(id);
        }
        match self.click_empty(store, point, grid) {
            Some(id) => PointerOutcome::Created(id),
            None => PointerOutcome::Cleared,
        }
    }

    /// Selects every shape in the store.
    pub fn select_all(&mut self, store: &ShapeStore) {
        self.selected = store.list().iter().map(|s| s.id.clone()).collect();
    }

    /// Drops ids whose shapes no longer exist.
    pub fn retain_existing(&mut self, store: &ShapeStore) {
        self.selected.retain(|id| store.contains(id));
    }

    /// Applies `patch` to every selected shape. Returns how many were updated.
    pub fn apply_to_selected(&self, store: &mut ShapeStore, patch: &ShapePatch) -> usize {
        self.selected
            .iter()
            .filter(|id| store.update(id, patch).is_ok())
            .count()
    }

    /// Removes the selected shapes and clears the selection.
    pub fn delete_selected(&mut self, store: &mut ShapeStore) -> usize {
        let ids: Vec<&String> = self.selected.iter().collect();
        let removed = store.remove(&ids);
        self.selected.clear();
        removed
    }

    /// Starts dragging the shape with `id`.
    ///
    /// An unselected shape becomes the sole selection first, so a drag
    /// always moves exactly the selected group. Nothing in the store changes
    /// until the session moves.
    ///
    /// # Returns
    ///
    /// `None` if the shape does not exist.
    pub fn begin_drag(&mut self, store: &ShapeStore, id: &str) -> Option<DragSession> {
        let dragged = store.get(id)?;
        if !self.is_selected(id) {
            self.click(id, false);
        }
        let start_positions = self
            .selected
            .iter()
            .filter_map(|sid| store.get(sid).map(|s| (sid.clone(), s.position())))
            .collect();
        Some(DragSession {
            dragged_id: id.to_string(),
            last_position: dragged.position(),
            start_positions,
        })
    }
}

/// Short-lived state of one group drag.
///
/// Created by [`SelectionController::begin_drag`] and consumed by
/// [`finish`](Self::finish) or [`cancel`](Self::cancel). The previous
/// position lives here, never on the shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    dragged_id: String,
    start_positions: HashMap<String, Point>,
    last_position: Point,
}

impl DragSession {
    pub fn dragged_id(&self) -> &str {
        &self.dragged_id
    }

    /// Position of every dragged shape when the drag started.
    pub fn start_positions(&self) -> &HashMap<String, Point> {
        &self.start_positions
    }

    pub fn last_position(&self) -> Point {
        self.last_position
    }

    /// Moves the dragged shape to the raw pointer-driven position `to` and
    /// moves every other shape in the group by the same delta. No snapping
    /// happens mid-drag.
    pub fn drag_to(&mut self, store: &mut ShapeStore, to: Point) {
        let (dx, dy) = self.last_position.delta_to(&to);
        self.translate_group(store, dx, dy);
        self.last_position = to;
    }

    /// Ends the drag. With snapping enabled, the dragged shape's last raw
    /// position is snapped and the one correction delta is applied to the
    /// whole group, so everything lands on the grid together.
    ///
    /// # Returns
    ///
    /// The final position of the dragged shape.
    pub fn finish(self, store: &mut ShapeStore, grid: &GridSnap) -> Point {
        if !grid.enabled {
            return self.last_position;
        }
        let snapped = grid.apply(self.last_position);
        let (dx, dy) = self.last_position.delta_to(&snapped);
        if dx != 0.0 || dy != 0.0 {
            self.translate_group(store, dx, dy);
        }
        snapped
    }

    /// Puts every shape back where it was when the drag started.
    pub fn cancel(self, store: &mut ShapeStore) {
        for (id, start) in &self.start_positions {
            if let Some(shape) = store.get_mut(id) {
                shape.set_position(*start);
            }
        }
    }

    fn translate_group(&self, store: &mut ShapeStore, dx: f64, dy: f64) {
        for id in self.start_positions.keys() {
            if let Some(shape) = store.get_mut(id) {
                shape.translate(dx, dy);
            }
        }
    }
}

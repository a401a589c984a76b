//! Ordered shape storage for one editing session.

use crate::model::{Shape, ShapePatch};
use thiserror::Error;

/// Errors raised by [`ShapeStore`] mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A shape with this id is already stored.
    #[error("Shape id '{0}' is already in use")]
    DuplicateId(String),

    /// No shape with this id is stored.
    #[error("Shape '{0}' not found")]
    NotFound(String),
}

/// Ordered collection of shapes and the sole source of truth while a
/// template is edited.
///
/// # Ordering
///
/// Render order is the position in the sequence: index 0 is drawn first
/// (bottom-most), the last shape is drawn on top. `list()` always reflects
/// that order.
///
/// # Mutation
///
/// Every mutation is synchronous and immediately visible. Nothing here
/// triggers saving, rendering or selection changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeStore {
    shapes: Vec<Shape>,
}

impl ShapeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `shape` on top of the render order.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] if the id is already in use.
    pub fn add(&mut self, shape: Shape) -> Result<(), StoreError> {
        if self.contains(&shape.id) {
            return Err(StoreError::DuplicateId(shape.id));
        }
        tracing::debug!(shape_id = %shape.id, shape_type = %shape.shape_type(), "Added shape");
        self.shapes.push(shape);
        Ok(())
    }

    /// Shallow-merges `patch` into the shape with `id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no shape has that id.
    pub fn update(&mut self, id: &str, patch: &ShapePatch) -> Result<(), StoreError> {
        let shape = self
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        shape.apply_patch(patch);
        Ok(())
    }

    /// Removes every shape whose id is in `ids`. Ids that are not stored
    /// are ignored. Returns how many shapes were removed.
    pub fn remove<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let before = self.shapes.len();
        self.shapes
            .retain(|shape| !ids.iter().any(|id| id.as_ref() == shape.id));
        before - self.shapes.len()
    }

    /// Replaces the whole collection, keeping the given order.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] if two shapes share an id; the store is
    /// left unchanged in that case.
    pub fn replace_all(&mut self, shapes: Vec<Shape>) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::with_capacity(shapes.len());
        for shape in &shapes {
            if !seen.insert(shape.id.as_str()) {
                return Err(StoreError::DuplicateId(shape.id.clone()));
            }
        }
        self.shapes = shapes;
        Ok(())
    }

    /// Shapes in render order.
    pub fn list(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.shapes.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Removes every shape.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Moves the shape to the top of the render order.
    pub fn bring_to_front(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        let shape = self.shapes.remove(index);
        self.shapes.push(shape);
        Ok(())
    }

    /// Moves the shape to the bottom of the render order.
    pub fn send_to_back(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        let shape = self.shapes.remove(index);
        self.shapes.insert(0, shape);
        Ok(())
    }

    /// Returns `prefix-N` for the smallest N not already used as an id.
    pub fn next_id(&self, prefix: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("{prefix}-{n}");
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn index_of(&self, id: &str) -> Result<usize, StoreError> {
        self.shapes
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

//! Grid snapping.

use crate::model::Point;

/// Rounds each coordinate of `point` to the nearest multiple of
/// `grid_size`. A non-positive or non-finite grid size leaves the point
/// unchanged.
pub fn snap(point: Point, grid_size: f64) -> Point {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return point;
    }
    Point::new(
        snap_value(point.x, grid_size),
        snap_value(point.y, grid_size),
    )
}

fn snap_value(value: f64, grid_size: f64) -> f64 {
    let snapped = (value / grid_size).round() * grid_size;
    // Keep -0.0 out of stored coordinates.
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Snap setting of an editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    pub enabled: bool,
    pub size: f64,
}

impl Default for GridSnap {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 20.0,
        }
    }
}

impl GridSnap {
    pub fn new(enabled: bool, size: f64) -> Self {
        Self { enabled, size }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Snaps `point` when enabled; the identity otherwise.
    pub fn apply(&self, point: Point) -> Point {
        if self.enabled {
            snap(point, self.size)
        } else {
            point
        }
    }
}

//! Grid and pixel geometry

use serde::{Deserialize, Serialize};

/// Cell coordinates inside a dashboard grid.
///
/// Signed because pointer conversion does not clamp: a pointer left of or
/// above the container maps to negative cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const ORIGIN: GridPosition = GridPosition { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height a widget occupies, in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: i32,
    pub height: i32,
}

impl Footprint {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of cells covered
    pub fn area(&self) -> i32 {
        self.width * self.height
    }
}

/// Grid dimensions of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub cols: i32,
    pub rows: i32,
}

impl GridSize {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self { cols: 12, rows: 8 }
    }
}

/// Bounding rectangle of the grid container, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether a point lies inside the rectangle (right/bottom edges excluded)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// A point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

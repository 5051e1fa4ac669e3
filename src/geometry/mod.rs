//! Page-space geometry.
//!
//! Coordinates are PDF user-space points with the origin at the bottom-left
//! corner and y growing upwards. Callers transform before handing shapes in.

use serde::{Deserialize, Serialize};

/// A position on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Point {
    /// Point at `(x, y)`.
    ///
    /// ```
    /// use pdf_glyphs::geometry::Point;
    ///
    /// let baseline = Point::new(72.0, 720.0);
    /// assert_eq!((baseline.x, baseline.y), (72.0, 720.0));
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box given by its lower-left corner and size, as `re` takes it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect {
    /// Box with lower-left corner `(x, y)`.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

//! Geometry primitives shared by the anchor model and the editor.
//!
//! All values are CSS pixels relative to the parent container. Right and
//! bottom edges of an [`AnchoredBoundary`] are *offsets from the parent's
//! right/bottom edge*, matching the `right:` / `bottom:` style properties.

use serde::{Deserialize, Serialize};

/// Width and height of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Rendered geometry of an element (`offsetLeft/Top/Width/Height`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Absolute boundary of a control as four edge offsets inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchoredBoundary {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl AnchoredBoundary {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Edge offsets of `rect` inside a parent of `parent` size.
    pub fn from_rect(rect: Rect, parent: Size) -> Self {
        Self {
            left: rect.x,
            top: rect.y,
            right: parent.width - rect.right(),
            bottom: parent.height - rect.bottom(),
        }
    }

    /// Pixel rectangle this boundary occupies inside a parent of `parent` size.
    pub fn to_rect(&self, parent: Size) -> Rect {
        Rect {
            x: self.left,
            y: self.top,
            width: parent.width - self.left - self.right,
            height: parent.height - self.top - self.bottom,
        }
    }
}

//! Geometry primitives shared by the solver, the viewport and the composer.
//!
//! Layout math is done in logical points (`f64`). The composer rounds the
//! final rectangles to the physical pixel grid of the monitor.

use serde::{Deserialize, Serialize};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };
}

/// A rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point lies inside this rectangle (right/bottom edges excluded).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Snap the edges of the rectangle to the physical pixel grid of a display
    /// with the given backing scale factor.
    ///
    /// Edges are rounded independently so that adjacent rectangles separated
    /// by a gap keep a constant gap after rounding.
    pub fn round_to_physical(&self, scale: f64) -> Rect {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let round = |v: f64| (v * scale).round() / scale;
        let left = round(self.x);
        let top = round(self.y);
        let right = round(self.right());
        let bottom = round(self.bottom());
        Rect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }
}

/// Which way the columns of a workspace scroll.
///
/// In `Horizontal` orientation columns are laid out left to right and windows
/// stack top to bottom inside them. `Vertical` transposes both axes: columns
/// become rows stacked top to bottom and windows sit side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Coordinate along the scroll axis.
    pub fn primary(self, point: Point) -> f64 {
        match self {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }

    /// Coordinate across the scroll axis.
    pub fn secondary(self, point: Point) -> f64 {
        match self {
            Orientation::Horizontal => point.y,
            Orientation::Vertical => point.x,
        }
    }

    pub fn primary_size(self, size: Size) -> f64 {
        match self {
            Orientation::Horizontal => size.width,
            Orientation::Vertical => size.height,
        }
    }

    pub fn secondary_size(self, size: Size) -> f64 {
        match self {
            Orientation::Horizontal => size.height,
            Orientation::Vertical => size.width,
        }
    }

    /// Origin of `rect` along the scroll axis.
    pub fn primary_origin(self, rect: &Rect) -> f64 {
        self.primary(Point::new(rect.x, rect.y))
    }

    pub fn secondary_origin(self, rect: &Rect) -> f64 {
        self.secondary(Point::new(rect.x, rect.y))
    }

    pub fn primary_extent(self, rect: &Rect) -> f64 {
        self.primary_size(rect.size())
    }

    pub fn secondary_extent(self, rect: &Rect) -> f64 {
        self.secondary_size(rect.size())
    }

    /// Build a screen rectangle from axis-relative components.
    pub fn rect(self, primary: f64, secondary: f64, primary_len: f64, secondary_len: f64) -> Rect {
        match self {
            Orientation::Horizontal => Rect::new(primary, secondary, primary_len, secondary_len),
            Orientation::Vertical => Rect::new(secondary, primary, secondary_len, primary_len),
        }
    }

    /// Translate a rectangle along the scroll axis.
    pub fn shift(self, rect: &Rect, delta: f64) -> Rect {
        match self {
            Orientation::Horizontal => rect.translated(delta, 0.0),
            Orientation::Vertical => rect.translated(0.0, delta),
        }
    }
}

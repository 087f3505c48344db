//! Container-relative geometry: points, sizes and axis-aligned rectangles.
//!
//! Every coordinate in this crate lives in one space, pixels relative to the
//! top-left corner of the campaign container. Nothing rotates.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in container space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`.
    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `pt` lies inside this box, edges included.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Axis-aligned overlap. Boxes that merely touch count as overlapping:
    /// only a strict gap on one side separates them.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x || self.x > other.right() || self.bottom() < other.y || self.y > other.bottom())
    }

    /// Whether this box lies entirely inside `[0, container.width] x [0, container.height]`.
    #[must_use]
    pub fn is_within(&self, container: Size) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= container.width && self.bottom() <= container.height
    }
}

/// Clamp `value` into `[0, limit]`, treating a negative limit as zero.
#[must_use]
pub fn clamp_axis(value: f64, limit: f64) -> f64 {
    value.min(limit.max(0.0)).max(0.0)
}

/// Clamp a top-left corner so a box of `size` stays inside `container`.
#[must_use]
pub fn clamp_origin(origin: Point, size: Size, container: Size) -> Point {
    Point {
        x: clamp_axis(origin.x, container.width - size.width),
        y: clamp_axis(origin.y, container.height - size.height),
    }
}

//! Axis-aligned rectangles for hitboxes, object bounds and zones
//!
//! Screen space: origin top-left, x grows right, y grows down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square box of half-size `half` centered on `center`
    pub fn centered(center: Vec2, half: f32) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Inclusive point test (a landmark on the edge counts as touching)
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Overlap test; rectangles that merely share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Horizontal overlap span with another rect, if any: (start, width)
    pub fn horizontal_overlap(&self, other: &Rect) -> Option<(f32, f32)> {
        let start = self.x.max(other.x);
        let end = self.right().min(other.right());
        (end > start).then_some((start, end - start))
    }
}

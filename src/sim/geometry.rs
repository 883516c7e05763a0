//! Collision primitives
//!
//! Axis-aligned rectangles and circles. Every dynamic body in the arena is
//! a [`Rect`]; obstacles may also be circles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CIRCLE_CONTACT_BUFFER;

/// Axis-aligned rectangle, stored as top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.w / 2.0;
        self.y = center.y - self.h / 2.0;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Grow (or shrink, for negative values) around the center
    pub fn inflate(&self, dw: f32, dh: f32) -> Self {
        Self::new(self.x - dw / 2.0, self.y - dh / 2.0, self.w + dw, self.h + dh)
    }

    /// Standard AABB overlap; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Overlap depth along each axis (zero when separated on that axis)
    pub fn overlap(&self, other: &Rect) -> Vec2 {
        let ox = self.right().min(other.right()) - self.left().max(other.left());
        let oy = self.bottom().min(other.bottom()) - self.top().max(other.top());
        Vec2::new(ox.max(0.0), oy.max(0.0))
    }

    /// Point of this rectangle closest to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left(), self.right()),
            p.y.clamp(self.top(), self.bottom()),
        )
    }

    /// Clamp inside `bounds` shrunk by `margin` on every side
    pub fn clamp_within(&mut self, bounds: &Rect, margin: f32) {
        let max_x = bounds.right() - self.w - margin;
        let max_y = bounds.bottom() - self.h - margin;
        self.x = self.x.clamp(bounds.left() + margin, max_x.max(bounds.left() + margin));
        self.y = self.y.clamp(bounds.top() + margin, max_y.max(bounds.top() + margin));
    }
}

/// A circle body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Bounding square
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.radius * 2.0, self.radius * 2.0)
    }

    /// Closest point on `rect` lies within the radius (plus a small buffer
    /// so edge-touching counts as contact)
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let closest = rect.closest_point(self.center);
        closest.distance(self.center) <= self.radius + CIRCLE_CONTACT_BUFFER
    }
}

//! Circle geometry
//!
//! Overlap is strict: circles that exactly touch do not overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Exact overlap test against another circle
    #[inline]
    pub fn overlaps(&self, other: &Circle) -> bool {
        circles_overlap(self.center, self.radius, other.center, other.radius)
    }

    /// Same circle moved by `offset`
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Circle {
        Circle::new(self.center + offset, self.radius)
    }

    /// Axis-aligned bounding square as (min, max)
    #[inline]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::splat(self.radius);
        (self.center - half, self.center + half)
    }
}

/// `distance(a, b) < ra + rb`, compared squared
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

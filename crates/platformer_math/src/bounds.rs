//! Axis-aligned bounding box.
//!
//! [`BoundingBox`] is the spatial footprint of an entity: its top-left
//! corner in world space plus a width and height. Screen-space Y grows
//! downwards, so a larger `y` is lower on screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    /// Top-left corner.
    pub position: Vec2,
    /// Width (`x`) and height (`y`).
    pub size: Vec2,
}

impl BoundingBox {
    /// An empty box at the origin.
    pub const ZERO: Self = Self {
        position: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    /// Create a box from its corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Create a box at the origin with the given dimensions.
    #[must_use]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Returns `true` if `point` lies strictly inside the box. Points on
    /// an edge are outside.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.position.x
            && point.x < self.position.x + self.size.x
            && point.y > self.position.y
            && point.y < self.position.y + self.size.y
    }

    /// Move the box by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec2) -> Self {
        self.position += offset;
        self
    }

    /// Scale the size uniformly, keeping the corner fixed.
    #[must_use]
    pub fn scaled(mut self, factor: f32) -> Self {
        self.size *= factor;
        self
    }

    /// Scale width and height independently, keeping the corner fixed.
    #[must_use]
    pub fn scaled_by(mut self, factors: Vec2) -> Self {
        self.size *= factors;
        self
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::ZERO
    }
}

//! # platformer_math
//!
//! Math types for the platformer runtime. Re-exports [`glam`] for vector
//! arithmetic and defines the axis-aligned [`BoundingBox`] used for entity
//! bounds and draw destinations.

pub mod bounds;

// Re-export glam types for convenience.
pub use glam::Vec2;

pub use bounds::BoundingBox;

//! Sprites, sprite sheets and textures.
//!
//! A [`Sprite`] cycles through frames; a [`SpriteSheet`] owns one sprite per
//! animation state and swaps between them. Sheets refer to the package
//! bundles through [`SpriteReference`]s and copy the sprite they resolve, so
//! animation state is never shared between two sheets.

mod sheet;
mod sprite;
mod texture;

pub use sheet::{SpriteReference, SpriteSheet};
pub use sprite::{Animation, Sprite};
pub use texture::{Texture, TextureReference};

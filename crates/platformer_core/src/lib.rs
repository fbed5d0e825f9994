//! # platformer_core
//!
//! Runtime core of a 2D side-scrolling platformer.
//!
//! This crate provides:
//!
//! - [`Database`]: the registry of packages, objects and assets, passed
//!   explicitly to everything that needs it.
//! - [`IdentityNumber`] / [`ShortIdentity`]: packed `(package, reference)`
//!   keys for objects and tiles.
//! - [`DataMap`]: typed property maps parsed from `<tag> <name> <value>`
//!   text resources.
//! - [`Sprite`] / [`SpriteSheet`]: frame animation with plain, timed and
//!   directional playback.
//! - [`Tile`] / [`TileGrid`] / [`Level`]: tile behavior flags, binary grid
//!   files and viewport-culled rendering.
//! - [`Player`] and [`physics::step`]: the per-frame movement integrator.
//! - [`Game`]: the create-resources / draw-frame pipeline a host drives.

pub mod assets;
pub mod bundle;
pub mod data;
pub mod database;
pub mod error;
pub mod game;
pub mod geometry;
pub mod host;
pub mod identity;
pub mod init;
pub mod input;
pub mod object;
pub mod package;
pub mod physics;
pub mod render;

pub use assets::Assets;
pub use bundle::{Bundle, SmallBatch};
pub use data::{DataMap, Property, Value};
pub use database::Database;
pub use error::{CoreError, Result};
pub use game::{Game, GameConfig};
pub use geometry::{Level, Tile, TileBehavior, TileGrid};
pub use host::{Bitmap, DirectorySource, DrawSurface, ImageLoader, MemorySource, ResourceSource};
pub use identity::{Identifiable, IdentityNumber, ShortIdentity};
pub use init::{CoreAssets, CreationHook, Initialization, Loader};
pub use input::{Key, KeyMap};
pub use object::{Direction, Entity, Object, Player};
pub use package::{Package, PackageTable};
pub use physics::PhysicsConfig;
pub use render::{Animation, Sprite, SpriteReference, SpriteSheet, Texture, TextureReference};

//! Tiles, tile grids and the level singleton.

mod grid;
mod level;
mod tile;

pub use grid::TileGrid;
pub use level::{Level, TILE_SIZE};
pub use tile::{Tile, TileBehavior};

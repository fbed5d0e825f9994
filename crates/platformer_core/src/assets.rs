//! Per-package resource storage: sprite and texture bundles and tile
//! batches.

use std::collections::HashMap;

use tracing::debug;

use crate::bundle::{Bundle, SmallBatch};
use crate::error::{CoreError, Result};
use crate::geometry::Tile;
use crate::identity::ShortIdentity;
use crate::package::Package;
use crate::render::{Sprite, Texture};

/// Resource storage keyed by package identifier.
#[derive(Debug, Default)]
pub struct Assets {
    sprites: HashMap<u8, Bundle<Sprite>>,
    textures: HashMap<u8, Bundle<Texture>>,
    tiles: HashMap<u8, SmallBatch<Tile>>,
}

impl Assets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a package its empty bundles and a tile batch holding the air
    /// tile in slot 0. Registering twice keeps the existing storage.
    pub fn register_package(&mut self, package: u8) {
        self.sprites
            .entry(package)
            .or_insert_with(|| Bundle::new(package));
        self.textures
            .entry(package)
            .or_insert_with(|| Bundle::new(package));
        self.tiles.entry(package).or_insert_with(|| {
            let mut air = Tile::air();
            air.set_identity(ShortIdentity::new(package, 0));
            SmallBatch::seeded(package, "tile", air)
        });
    }

    #[must_use]
    pub fn has_package(&self, package: u8) -> bool {
        self.tiles.contains_key(&package)
    }

    /// Register a sprite under `key`.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if the package has no storage,
    /// [`CoreError::DuplicateResource`] if the key is taken.
    pub fn add_sprite(&mut self, package: u8, key: impl Into<String>, sprite: Sprite) -> Result<()> {
        let bundle = self
            .sprites
            .get_mut(&package)
            .ok_or(CoreError::UnregisteredPackage(package))?;
        let key = key.into();
        if !bundle.add(key.clone(), sprite) {
            return Err(CoreError::DuplicateResource {
                kind: "sprite",
                package,
                key,
            });
        }
        debug!(package, key = %key, "registered sprite");
        Ok(())
    }

    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] or [`CoreError::UnregisteredSprite`].
    pub fn sprite(&self, package: u8, key: &str) -> Result<&Sprite> {
        self.sprites
            .get(&package)
            .ok_or(CoreError::UnregisteredPackage(package))?
            .get(key)
            .ok_or_else(|| CoreError::UnregisteredSprite {
                package,
                key: key.to_string(),
            })
    }

    /// Register a texture under `key`.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if the package has no storage,
    /// [`CoreError::DuplicateResource`] if the key is taken.
    pub fn add_texture(
        &mut self,
        package: u8,
        key: impl Into<String>,
        texture: Texture,
    ) -> Result<()> {
        let bundle = self
            .textures
            .get_mut(&package)
            .ok_or(CoreError::UnregisteredPackage(package))?;
        let key = key.into();
        if !bundle.add(key.clone(), texture) {
            return Err(CoreError::DuplicateResource {
                kind: "texture",
                package,
                key,
            });
        }
        debug!(package, key = %key, "registered texture");
        Ok(())
    }

    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] or [`CoreError::UnregisteredTexture`].
    pub fn texture(&self, package: u8, key: &str) -> Result<&Texture> {
        self.textures
            .get(&package)
            .ok_or(CoreError::UnregisteredPackage(package))?
            .get(key)
            .ok_or_else(|| CoreError::UnregisteredTexture {
                package,
                key: key.to_string(),
            })
    }

    /// Append a tile to the package's batch, stamp it with its short
    /// identity and return the slot.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if the package has no storage,
    /// [`CoreError::SmallBatchOverflow`] if the batch is full.
    pub fn add_tile(&mut self, package: u8, tile: Tile) -> Result<u8> {
        let batch = self
            .tiles
            .get_mut(&package)
            .ok_or(CoreError::UnregisteredPackage(package))?;
        let slot = batch.add(tile)?;
        if let Some(tile) = batch.get_mut(slot) {
            tile.set_identity(ShortIdentity::new(package, slot));
        }
        debug!(package, slot, "registered tile");
        Ok(slot)
    }

    /// Look a tile up by slot. Slot 0 of any package is the core air tile.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] or [`CoreError::UnregisteredTile`].
    pub fn tile(&self, package: u8, slot: u8) -> Result<&Tile> {
        let package = if slot == 0 { Package::CORE_ID } else { package };
        self.tile_batch(package)?
            .get(slot)
            .ok_or(CoreError::UnregisteredTile { package, slot })
    }

    /// # Errors
    ///
    /// See [`Assets::tile`].
    pub fn tile_by_identity(&self, identity: ShortIdentity) -> Result<&Tile> {
        self.tile(identity.package(), identity.slot())
    }

    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if the package has no storage.
    pub fn tile_batch(&self, package: u8) -> Result<&SmallBatch<Tile>> {
        self.tiles
            .get(&package)
            .ok_or(CoreError::UnregisteredPackage(package))
    }
}

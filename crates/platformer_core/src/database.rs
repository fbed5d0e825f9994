//! The process-owned registry context.
//!
//! [`Database`] holds the package table, every live object keyed by
//! [`IdentityNumber`], the per-package asset storage and the camera. It is
//! created once at startup and passed explicitly to loading, physics and
//! rendering code.

use std::collections::HashMap;

use platformer_math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::assets::Assets;
use crate::bundle::SmallBatch;
use crate::error::{CoreError, Result};
use crate::geometry::{Level, Tile};
use crate::identity::{Identifiable, IdentityNumber};
use crate::object::{Object, Player};
use crate::package::{Package, PackageTable};
use crate::render::{Sprite, Texture};

/// Registry of packages, objects and assets.
#[derive(Debug)]
pub struct Database {
    packages: PackageTable,
    objects: HashMap<IdentityNumber, Object>,
    /// Live non-reserved objects per package.
    live: HashMap<u8, usize>,
    assets: Assets,
    rng: StdRng,
    /// Level camera position in cell units.
    pub camera: Vec2,
}

impl Database {
    /// A database holding the core package and nothing else.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Like [`Database::new`] but with reproducible identity reassignment.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut assets = Assets::new();
        assets.register_package(Package::CORE_ID);
        Self {
            packages: PackageTable::new(),
            objects: HashMap::new(),
            live: HashMap::new(),
            assets,
            rng,
            camera: Vec2::ZERO,
        }
    }

    #[must_use]
    pub fn packages(&self) -> &PackageTable {
        &self.packages
    }

    #[must_use]
    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut Assets {
        &mut self.assets
    }

    /// Allocate a package and give it empty asset storage.
    ///
    /// # Errors
    ///
    /// See [`PackageTable::create`].
    pub fn create_package(&mut self, name: &str) -> Result<Package> {
        let package = self.packages.create(name)?;
        self.assets.register_package(package.id());
        Ok(package)
    }

    /// Register a package with an explicit identifier.
    ///
    /// # Errors
    ///
    /// See [`PackageTable::register`].
    pub fn register_package(&mut self, package: Package) -> Result<()> {
        let id = package.id();
        self.packages.register(package)?;
        self.assets.register_package(id);
        Ok(())
    }

    fn require_package(&self, package: u8) -> Result<()> {
        if self.packages.is_registered(package) {
            Ok(())
        } else {
            Err(CoreError::UnregisteredPackage(package))
        }
    }

    /// Look an object up.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if the identity's package is
    /// unknown, [`CoreError::UnregisteredObject`] if nothing lives there.
    pub fn get(&self, id: IdentityNumber) -> Result<&Object> {
        debug!(id = %id, "get");
        self.require_package(id.package())?;
        self.objects.get(&id).ok_or(CoreError::UnregisteredObject(id))
    }

    /// # Errors
    ///
    /// See [`Database::get`].
    pub fn get_mut(&mut self, id: IdentityNumber) -> Result<&mut Object> {
        debug!(id = %id, "get");
        self.require_package(id.package())?;
        self.objects
            .get_mut(&id)
            .ok_or(CoreError::UnregisteredObject(id))
    }

    #[must_use]
    pub fn contains(&self, id: IdentityNumber) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Insert an object at its current identity. If that identity is taken,
    /// or reserved for a singleton the object is not, the object is moved to
    /// a random free identity in the same package first.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`],
    /// [`CoreError::IdentitySpaceExhausted`] when no free identity is left,
    /// or [`CoreError::ImmutableIdentity`] when a singleton's fixed identity
    /// is already taken.
    pub fn add(&mut self, object: impl Into<Object>) -> Result<IdentityNumber> {
        let mut object = object.into();
        let requested = object.identity();
        self.require_package(requested.package())?;

        let id = if self.objects.contains_key(&requested) || !object.may_hold(requested) {
            let fresh = self.free_identity(requested.package())?;
            object.set_identity(fresh)?;
            debug!(requested = %requested, id = %fresh, "reassigned identity");
            fresh
        } else {
            requested
        };
        debug!(id = %id, kind = object.kind(), "add");
        self.insert_object(id, object);
        Ok(id)
    }

    fn insert_object(&mut self, id: IdentityNumber, object: Object) -> Option<Object> {
        let prior = self.objects.insert(id, object);
        if prior.is_none() && !id.is_reserved() {
            *self.live.entry(id.package()).or_default() += 1;
        }
        prior
    }

    fn remove_object(&mut self, id: IdentityNumber) -> Option<Object> {
        let removed = self.objects.remove(&id);
        if removed.is_some() && !id.is_reserved() {
            if let Some(count) = self.live.get_mut(&id.package()) {
                *count -= 1;
            }
        }
        removed
    }

    fn free_identity(&mut self, package: u8) -> Result<IdentityNumber> {
        let reserved = if package == Package::CORE_ID { 2 } else { 0 };
        let used = self.live.get(&package).copied().unwrap_or_default();
        if used + reserved >= IdentityNumber::REFERENCES_PER_PACKAGE as usize {
            return Err(CoreError::IdentitySpaceExhausted(package));
        }
        loop {
            let id = IdentityNumber::new(package, self.rng.r#gen::<u16>());
            if !id.is_reserved() && !self.objects.contains_key(&id) {
                return Ok(id);
            }
        }
    }

    /// Bind an object to `id`, replacing whatever lived there.
    ///
    /// # Errors
    ///
    /// [`CoreError::IdentityOverride`] if `id` is reserved for another kind
    /// of object, [`CoreError::UnregisteredPackage`], or the object's own
    /// refusal to change identity.
    pub fn set(&mut self, object: impl Into<Object>, id: IdentityNumber) -> Result<()> {
        let mut object = object.into();
        self.require_package(id.package())?;
        if id.is_reserved() && !object.may_hold(id) {
            return Err(CoreError::IdentityOverride(id));
        }
        object.set_identity(id)?;
        if let Some(prior) = self.insert_object(id, object) {
            debug!(id = %id, kind = prior.kind(), "released prior occupant");
        }
        debug!(id = %id, "set");
        Ok(())
    }

    /// Remove the object at `id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if the identity's package is
    /// unknown.
    pub fn release(&mut self, id: IdentityNumber) -> Result<bool> {
        self.require_package(id.package())?;
        let removed = self.remove_object(id).is_some();
        debug!(id = %id, removed, "release");
        Ok(removed)
    }

    /// Register a tile in a package's batch and return its slot.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] or
    /// [`CoreError::SmallBatchOverflow`].
    pub fn add_tile(&mut self, package: u8, tile: Tile) -> Result<u8> {
        self.require_package(package)?;
        self.assets.add_tile(package, tile)
    }

    /// Register a sprite in a package's bundle.
    ///
    /// # Errors
    ///
    /// See [`Assets::add_sprite`].
    pub fn add_sprite(&mut self, package: u8, key: impl Into<String>, sprite: Sprite) -> Result<()> {
        self.require_package(package)?;
        self.assets.add_sprite(package, key, sprite)
    }

    /// # Errors
    ///
    /// See [`Assets::sprite`].
    pub fn sprite(&self, package: u8, key: &str) -> Result<&Sprite> {
        self.assets.sprite(package, key)
    }

    /// Register a texture in a package's bundle.
    ///
    /// # Errors
    ///
    /// See [`Assets::add_texture`].
    pub fn add_texture(&mut self, package: u8, key: impl Into<String>, texture: Texture) -> Result<()> {
        self.require_package(package)?;
        self.assets.add_texture(package, key, texture)
    }

    /// # Errors
    ///
    /// See [`Assets::texture`].
    pub fn texture(&self, package: u8, key: &str) -> Result<&Texture> {
        self.assets.texture(package, key)
    }

    /// # Errors
    ///
    /// See [`Assets::tile`].
    pub fn tile(&self, package: u8, slot: u8) -> Result<&Tile> {
        self.assets.tile(package, slot)
    }

    /// # Errors
    ///
    /// See [`Assets::tile_batch`].
    pub fn tile_batch(&self, package: u8) -> Result<&SmallBatch<Tile>> {
        self.assets.tile_batch(package)
    }

    /// # Errors
    ///
    /// [`CoreError::UnregisteredObject`] if no player is registered.
    pub fn player(&self) -> Result<&Player> {
        match self.objects.get(&IdentityNumber::PLAYER) {
            Some(Object::Player(player)) => Ok(&**player),
            _ => Err(CoreError::UnregisteredObject(IdentityNumber::PLAYER)),
        }
    }

    /// # Errors
    ///
    /// [`CoreError::UnregisteredObject`] if no player is registered.
    pub fn player_mut(&mut self) -> Result<&mut Player> {
        match self.objects.get_mut(&IdentityNumber::PLAYER) {
            Some(Object::Player(player)) => Ok(&mut **player),
            _ => Err(CoreError::UnregisteredObject(IdentityNumber::PLAYER)),
        }
    }

    /// The player together with the assets its sprites resolve against.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredObject`] if no player is registered.
    pub fn player_with_assets(&mut self) -> Result<(&mut Player, &Assets)> {
        match self.objects.get_mut(&IdentityNumber::PLAYER) {
            Some(Object::Player(player)) => Ok((&mut **player, &self.assets)),
            _ => Err(CoreError::UnregisteredObject(IdentityNumber::PLAYER)),
        }
    }

    /// Install the player singleton, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Never in practice; kept fallible like [`Database::set`].
    pub fn set_player(&mut self, player: Player) -> Result<()> {
        self.set(player, IdentityNumber::PLAYER)
    }

    /// # Errors
    ///
    /// [`CoreError::UnregisteredObject`] if no level is registered.
    pub fn level(&self) -> Result<&Level> {
        match self.objects.get(&IdentityNumber::LEVEL) {
            Some(Object::Level(level)) => Ok(&**level),
            _ => Err(CoreError::UnregisteredObject(IdentityNumber::LEVEL)),
        }
    }

    /// Install the level singleton, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Never in practice; kept fallible like [`Database::set`].
    pub fn set_level(&mut self, level: Level) -> Result<()> {
        self.set(level, IdentityNumber::LEVEL)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

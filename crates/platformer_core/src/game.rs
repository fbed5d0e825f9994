//! The per-frame pipeline the host drives.
//!
//! The host calls [`Game::create_resources`] once, forwards key events to
//! [`Game::key_down`] and [`Game::key_up`], and calls [`Game::draw_frame`]
//! on every animation tick.

use platformer_math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::database::Database;
use crate::error::{CoreError, Result};
use crate::geometry::Level;
use crate::host::{DrawSurface, ImageLoader, ResourceSource};
use crate::init::{CoreAssets, Initialization, Loader};
use crate::input::{Key, KeyMap};
use crate::package::Package;
use crate::physics::{self, PhysicsConfig};

/// Length of the floor debug line.
const FLOOR_LINE_LENGTH: f32 = 10_000.0;

/// Game-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// World y coordinate of the floor.
    pub floor: f32,
    /// Initial level camera, in cell units.
    pub camera: Vec2,
    pub assets: CoreAssets,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            floor: 500.0,
            camera: Vec2::ZERO,
            assets: CoreAssets::default(),
        }
    }
}

/// Owns the database, input state and physics constants for one session.
pub struct Game {
    db: Database,
    keys: KeyMap,
    physics: Option<PhysicsConfig>,
    init: Initialization,
    config: GameConfig,
    frame: u64,
}

impl Game {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_database(config, Database::new())
    }

    /// A game over an existing database, e.g. one with a fixed seed or
    /// extra packages.
    #[must_use]
    pub fn with_database(config: GameConfig, db: Database) -> Self {
        Self {
            db,
            keys: KeyMap::new(),
            physics: None,
            init: Initialization::with_core(config.assets.clone()),
            config,
            frame: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Creation phases, for registering extension hooks before
    /// [`Game::create_resources`].
    pub fn init_mut(&mut self) -> &mut Initialization {
        &mut self.init
    }

    #[must_use]
    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }

    #[must_use]
    pub fn physics(&self) -> Option<&PhysicsConfig> {
        self.physics.as_ref()
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn key_down(&mut self, key: Key) {
        self.keys.press(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys.release(key);
    }

    /// Run every creation phase, then load the physics constants and the
    /// starting level. Phases that already ran are skipped.
    ///
    /// # Errors
    ///
    /// Any loading error. The caller is expected to abort.
    pub fn create_resources(
        &mut self,
        source: &dyn ResourceSource,
        images: &mut dyn ImageLoader,
    ) -> Result<()> {
        info!("creating resources");
        {
            let mut loader = Loader::new(source, images);
            self.init.create_textures(&mut self.db, &mut loader)?;
            self.init.create_sprites(&mut self.db, &mut loader)?;
            self.init.create_sheets(&mut self.db, &mut loader)?;
            self.init.create_tiles(&mut self.db, &mut loader)?;
        }

        if self.physics.is_none() {
            self.physics = Some(PhysicsConfig::load(
                source,
                &self.config.assets.controls,
                Package::CORE_ID,
                self.db.packages(),
            )?);
        }

        if let Some(path) = &self.config.assets.level {
            let level = Level::load(source, path, Package::CORE_ID, self.db.assets())?;
            self.db.set_level(level)?;
        }
        self.db.camera = self.config.camera;
        info!(objects = self.db.len(), "resources created");
        Ok(())
    }

    /// Advance and draw one frame: physics, then the level, then the
    /// player, then the floor line.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotInitialized`] before [`Game::create_resources`], or
    /// any lookup error raised while stepping or drawing. The caller is
    /// expected to log it and carry on with the next frame.
    pub fn draw_frame(&mut self, surface: &mut dyn DrawSurface) -> Result<()> {
        let physics = self
            .physics
            .ok_or(CoreError::NotInitialized("physics constants"))?;
        let floor = self.config.floor;

        let (player, assets) = self.db.player_with_assets()?;
        physics::step(&physics, player, &self.keys, floor, assets)?;

        if let Ok(level) = self.db.level() {
            level.render(surface, self.db.camera, self.db.assets())?;
        }

        let (player, assets) = self.db.player_with_assets()?;
        player.render(surface, assets, physics.render_scale)?;

        surface.draw_line(Vec2::new(0.0, floor), Vec2::new(FLOOR_LINE_LENGTH, floor));
        self.frame += 1;
        debug!(frame = self.frame, "drew frame");
        Ok(())
    }
}

//! Registry occupants: plain entities, the player and the level.

use platformer_math::{BoundingBox, Vec2};
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::data::DataMap;
use crate::error::{CoreError, Result};
use crate::geometry::Level;
use crate::host::{DrawSurface, ResourceSource};
use crate::identity::{Identifiable, IdentityNumber};
use crate::package::PackageTable;
use crate::render::SpriteSheet;

/// Compass direction an object faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Animation states of the player's sprite sheet.
pub mod state {
    pub const IDLE: u8 = 0;
    pub const WALK: u8 = 1;
    pub const RUN: u8 = 2;
    pub const AIRBORNE: u8 = 3;
}

/// A moving box with an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    identity: IdentityNumber,
    pub velocity: Vec2,
    bounds: BoundingBox,
}

impl Entity {
    #[must_use]
    pub fn new(identity: IdentityNumber, bounds: BoundingBox) -> Self {
        Self {
            identity,
            velocity: Vec2::ZERO,
            bounds,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.bounds.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.bounds.position = position;
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    /// Move by one step of the current velocity.
    pub fn do_velocity(&mut self) {
        self.bounds = self.bounds.translated(self.velocity);
    }
}

impl Identifiable for Entity {
    fn identity(&self) -> IdentityNumber {
        self.identity
    }

    fn set_identity(&mut self, identity: IdentityNumber) -> Result<()> {
        self.identity = identity;
        Ok(())
    }
}

/// The player singleton, always at [`IdentityNumber::PLAYER`].
#[derive(Debug, Clone)]
pub struct Player {
    body: Entity,
    sprites: SpriteSheet,
    facing: bool,
    state: u8,
}

impl Player {
    /// Default footprint of the player.
    pub const SIZE: Vec2 = Vec2::new(32.0, 48.0);

    /// A player at the origin facing right, idle.
    #[must_use]
    pub fn new(sprites: SpriteSheet) -> Self {
        Self {
            body: Entity::new(
                IdentityNumber::PLAYER,
                BoundingBox::from_size(Self::SIZE.x, Self::SIZE.y),
            ),
            sprites,
            facing: false,
            state: state::IDLE,
        }
    }

    /// Build a player from a map holding a `bounds` rect and the path of its
    /// `sprites` sheet.
    ///
    /// # Errors
    ///
    /// A missing or mistyped property, or any error loading the sheet.
    pub fn from_data_map(
        map: &DataMap,
        source: &dyn ResourceSource,
        packages: &PackageTable,
        assets: &Assets,
    ) -> Result<Self> {
        map.check_for_set(&["bounds", "sprites"])?;
        let bounds = map.rect("bounds")?;
        let sheet = SpriteSheet::load(source, map.sheet("sprites")?, map.package(), packages, assets)?;
        let mut player = Self::new(sheet);
        player.body.bounds = bounds;
        Ok(player)
    }

    #[must_use]
    pub fn body(&self) -> &Entity {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }

    #[must_use]
    pub fn sprites(&self) -> &SpriteSheet {
        &self.sprites
    }

    /// `true` when facing left.
    #[must_use]
    pub fn facing(&self) -> bool {
        self.facing
    }

    /// Turn the player. The sprite sheet follows with its reverse frames.
    pub fn set_facing(&mut self, facing: bool) {
        if facing == self.facing {
            return;
        }
        self.facing = facing;
        self.sprites.set_reverse(facing);
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.facing {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    #[must_use]
    pub fn state(&self) -> u8 {
        self.state
    }

    /// Change the animation state and switch the sprite sheet with it.
    ///
    /// # Errors
    ///
    /// Any [`SpriteSheet::set_state`] error. The state is unchanged on error.
    pub fn set_state(&mut self, state: u8, assets: &Assets) -> Result<()> {
        if state == self.state {
            return Ok(());
        }
        self.sprites.set_state(state, assets)?;
        self.state = state;
        Ok(())
    }

    /// Draw the current sprite frame over the player's box, scaled by
    /// `scale`.
    ///
    /// # Errors
    ///
    /// A sprite resolution error.
    pub fn render(&mut self, surface: &mut dyn DrawSurface, assets: &Assets, scale: f32) -> Result<()> {
        let frame = self.sprites.next_frame(assets)?;
        surface.draw_image(frame, self.body.bounds.scaled(scale));
        Ok(())
    }
}

impl Identifiable for Player {
    fn identity(&self) -> IdentityNumber {
        IdentityNumber::PLAYER
    }

    fn set_identity(&mut self, identity: IdentityNumber) -> Result<()> {
        if identity == IdentityNumber::PLAYER {
            Ok(())
        } else {
            Err(CoreError::ImmutableIdentity("player"))
        }
    }
}

/// Everything the registry can hold.
#[derive(Debug, Clone)]
pub enum Object {
    Entity(Entity),
    Player(Box<Player>),
    Level(Box<Level>),
}

impl Object {
    /// Whether this object may sit on a reserved identity.
    #[must_use]
    pub fn may_hold(&self, identity: IdentityNumber) -> bool {
        match self {
            Object::Player(_) => identity == IdentityNumber::PLAYER,
            Object::Level(_) => identity == IdentityNumber::LEVEL,
            Object::Entity(_) => !identity.is_reserved(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Entity(_) => "entity",
            Object::Player(_) => "player",
            Object::Level(_) => "level",
        }
    }
}

impl Identifiable for Object {
    fn identity(&self) -> IdentityNumber {
        match self {
            Object::Entity(e) => e.identity(),
            Object::Player(p) => p.identity(),
            Object::Level(l) => l.identity(),
        }
    }

    fn set_identity(&mut self, identity: IdentityNumber) -> Result<()> {
        match self {
            Object::Entity(e) => e.set_identity(identity),
            Object::Player(p) => p.set_identity(identity),
            Object::Level(l) => l.set_identity(identity),
        }
    }
}

impl From<Entity> for Object {
    fn from(entity: Entity) -> Self {
        Object::Entity(entity)
    }
}

impl From<Player> for Object {
    fn from(player: Player) -> Self {
        Object::Player(Box::new(player))
    }
}

impl From<Level> for Object {
    fn from(level: Level) -> Self {
        Object::Level(Box::new(level))
    }
}

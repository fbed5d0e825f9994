use serde::{Deserialize, Serialize};

use crate::data::DataMap;
use crate::identity::ShortIdentity;
use crate::render::TextureReference;

/// Gameplay flags of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileBehavior(pub u8);

impl TileBehavior {
    /// Nothing special; the player passes through.
    pub const EMPTY: Self = Self(0);

    /// Solid.
    pub const COLLIDE: Self = Self(1 << 0);

    pub const SLOW: Self = Self(1 << 1);

    pub const BOUNCE: Self = Self(1 << 2);

    pub const SWIM: Self = Self(1 << 3);

    pub const DAMAGE: Self = Self(1 << 4);

    pub const FAST: Self = Self(1 << 5);

    /// Every defined flag.
    pub const ALL: Self = Self(0b11_1111);

    /// Keep only the defined flags of a raw value.
    #[inline]
    #[must_use]
    pub fn from_bits_truncate(bits: i32) -> Self {
        Self((bits & i32::from(Self::ALL.0)) as u8)
    }

    #[inline]
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TileBehavior {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A registered tile: behavior flags plus an optional texture.
///
/// The identity is assigned when the tile is added to its package's batch;
/// nothing else changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    identity: ShortIdentity,
    behavior: TileBehavior,
    image: Option<TextureReference>,
}

impl Tile {
    /// The air tile. It has no image and no behavior.
    #[must_use]
    pub fn air() -> Self {
        Self {
            identity: ShortIdentity::AIR,
            behavior: TileBehavior::EMPTY,
            image: None,
        }
    }

    #[must_use]
    pub fn new(behavior: TileBehavior, image: Option<TextureReference>) -> Self {
        Self {
            identity: ShortIdentity::AIR,
            behavior,
            image,
        }
    }

    /// Build a tile from a map with a texture `image` and an int
    /// `behavior`. Unknown behavior bits are dropped.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`](crate::CoreError::MissingProperty)
    /// or a property type error.
    pub fn from_data_map(map: &DataMap) -> crate::Result<Self> {
        map.check_for_set(&["image", "behavior"])?;
        let image = map.texture("image")?.clone();
        let behavior = TileBehavior::from_bits_truncate(map.int("behavior")?);
        Ok(Self::new(behavior, Some(image)))
    }

    #[must_use]
    pub fn identity(&self) -> ShortIdentity {
        self.identity
    }

    pub(crate) fn set_identity(&mut self, identity: ShortIdentity) {
        self.identity = identity;
    }

    #[must_use]
    pub fn behavior(&self) -> TileBehavior {
        self.behavior
    }

    #[must_use]
    pub fn image(&self) -> Option<&TextureReference> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn is_air(&self) -> bool {
        self.identity.is_air()
    }
}

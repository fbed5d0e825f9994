//! Sprite sheets: one sprite per animation state.

use std::fmt;

use tracing::debug;

use crate::assets::Assets;
use crate::data::DataMap;
use crate::error::{CoreError, Result};
use crate::host::{Bitmap, ResourceSource};
use crate::package::PackageTable;
use crate::render::Sprite;

/// A `package:key` pointer into a sprite bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpriteReference {
    pub package: u8,
    pub key: String,
}

impl SpriteReference {
    #[must_use]
    pub fn new(package: u8, key: impl Into<String>) -> Self {
        Self {
            package,
            key: key.into(),
        }
    }

    /// Fetch a private copy of the registered sprite, rewound to frame 0.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredSprite`] if nothing is registered under the
    /// key.
    pub fn resolve(&self, assets: &Assets) -> Result<Sprite> {
        let mut sprite = assets.sprite(self.package, &self.key)?.clone();
        sprite.reset();
        Ok(sprite)
    }
}

impl fmt::Display for SpriteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.key)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    sprite: Option<Sprite>,
    source: Option<SpriteReference>,
}

/// Per-state sprites with lazy resolution from sprite references.
///
/// Every sheet owns its sprites, so two sheets built from the same
/// references never share playback position.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    slots: Vec<Slot>,
    state: u8,
    reverse: bool,
}

impl SpriteSheet {
    /// A sheet over already-built sprites, starting in state 0.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidState`] if `states` is empty or has more than 256
    /// entries.
    pub fn new(states: Vec<Sprite>) -> Result<Self> {
        let slots = states
            .into_iter()
            .map(|sprite| Slot {
                sprite: Some(sprite),
                source: None,
            })
            .collect();
        Self::with_slots(slots)
    }

    fn with_slots(slots: Vec<Slot>) -> Result<Self> {
        if slots.is_empty() || slots.len() > usize::from(u8::MAX) + 1 {
            return Err(CoreError::InvalidState {
                state: 0,
                states: slots.len(),
            });
        }
        Ok(Self {
            slots,
            state: 0,
            reverse: false,
        })
    }

    /// Build a sheet from a map with a `states` count and one sprite
    /// reference per state (`state0`, `state1`, ...).
    ///
    /// References are resolved right away where possible. A sprite that is
    /// not registered yet is resolved on first use instead.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] listing every absent key, or a property
    /// type error.
    pub fn from_data_map(map: &DataMap, assets: &Assets) -> Result<Self> {
        map.check_for_set(&["states"])?;
        let states = map.byte("states")?;
        let keys: Vec<String> = (0..states).map(|n| format!("state{n}")).collect();
        let required: Vec<&str> = keys.iter().map(String::as_str).collect();
        map.check_for_set(&required)?;

        let mut slots = Vec::with_capacity(keys.len());
        for key in &keys {
            let source = map.sprite(key)?.clone();
            let sprite = match source.resolve(assets) {
                Ok(sprite) => Some(sprite),
                Err(CoreError::UnregisteredSprite { .. }) => {
                    debug!(reference = %source, "deferring sprite resolution");
                    None
                }
                Err(e) => return Err(e),
            };
            slots.push(Slot {
                sprite,
                source: Some(source),
            });
        }
        Self::with_slots(slots)
    }

    /// Read a sheet property file and build the sheet.
    ///
    /// # Errors
    ///
    /// A resource, parse or property error.
    pub fn load(
        source: &dyn ResourceSource,
        path: &str,
        package: u8,
        packages: &PackageTable,
        assets: &Assets,
    ) -> Result<Self> {
        let map = DataMap::load(package, source, path, packages)?;
        Self::from_data_map(&map, assets)
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> u8 {
        self.state
    }

    /// Switch the animation state.
    ///
    /// The outgoing sprite is rewound and the incoming one picks up the
    /// sheet's reverse flag. Setting the current state is a no-op.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidState`] if `state` has no slot, or a resolution
    /// error for the incoming sprite. The sheet is unchanged on error.
    pub fn set_state(&mut self, state: u8, assets: &Assets) -> Result<()> {
        if state == self.state {
            return Ok(());
        }
        if usize::from(state) >= self.slots.len() {
            return Err(CoreError::InvalidState {
                state,
                states: self.slots.len(),
            });
        }
        Self::materialize(&mut self.slots[usize::from(state)], self.reverse, assets)?;
        if let Some(sprite) = self.slots[usize::from(self.state)].sprite.as_mut() {
            sprite.reset();
        }
        self.state = state;
        Ok(())
    }

    #[must_use]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Set the reverse flag and pass it to the current sprite.
    pub fn set_reverse(&mut self, reverse: bool) {
        if reverse == self.reverse {
            return;
        }
        self.reverse = reverse;
        if let Some(sprite) = self.slots[usize::from(self.state)].sprite.as_mut() {
            sprite.set_reverse(reverse);
        }
    }

    /// Make sure the current state's sprite is loaded.
    ///
    /// # Errors
    ///
    /// A resolution error if the sprite is still not registered.
    pub fn verify_sprite(&mut self, assets: &Assets) -> Result<()> {
        Self::materialize(&mut self.slots[usize::from(self.state)], self.reverse, assets)
    }

    fn materialize(slot: &mut Slot, reverse: bool, assets: &Assets) -> Result<()> {
        if slot.sprite.is_none() {
            let source = slot.source.as_ref().ok_or(CoreError::EmptySprite)?;
            slot.sprite = Some(source.resolve(assets)?);
        }
        if let Some(sprite) = slot.sprite.as_mut() {
            sprite.set_reverse(reverse);
        }
        Ok(())
    }

    /// The next frame of the current state's sprite.
    ///
    /// # Errors
    ///
    /// A resolution error if the sprite cannot be loaded.
    pub fn next_frame(&mut self, assets: &Assets) -> Result<Bitmap> {
        let slot = &mut self.slots[usize::from(self.state)];
        Self::materialize(slot, self.reverse, assets)?;
        match slot.sprite.as_mut() {
            Some(sprite) => Ok(sprite.next_frame()),
            None => Err(CoreError::EmptySprite),
        }
    }

    /// Drop the loaded sprite of a state that can be resolved again later.
    /// Returns whether anything was dropped.
    pub fn unload(&mut self, state: u8) -> bool {
        match self.slots.get_mut(usize::from(state)) {
            Some(slot) if slot.source.is_some() => slot.sprite.take().is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::package::Package;

    fn frames(base: u32, n: u32) -> Vec<Bitmap> {
        (base..base + n).map(Bitmap).collect()
    }

    fn assets_with(sprites: &[(&str, Sprite)]) -> Assets {
        let mut assets = Assets::new();
        assets.register_package(Package::CORE_ID);
        for (key, sprite) in sprites {
            assets
                .add_sprite(Package::CORE_ID, *key, sprite.clone())
                .unwrap();
        }
        assets
    }

    #[test]
    fn test_set_state_resets_previous_sprite() {
        let assets = Assets::new();
        let idle = Sprite::plain(frames(0, 3)).unwrap();
        let walk = Sprite::plain(frames(10, 3)).unwrap();
        let mut sheet = SpriteSheet::new(vec![idle, walk]).unwrap();

        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(0));
        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(1));
        sheet.set_state(1, &assets).unwrap();
        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(10));
        sheet.set_state(0, &assets).unwrap();
        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(0));
    }

    #[test]
    fn test_set_state_out_of_range() {
        let assets = Assets::new();
        let mut sheet = SpriteSheet::new(vec![Sprite::plain(frames(0, 1)).unwrap()]).unwrap();
        assert!(matches!(
            sheet.set_state(3, &assets),
            Err(CoreError::InvalidState { state: 3, states: 1 })
        ));
        assert_eq!(sheet.state(), 0);
    }

    #[test]
    fn test_reverse_propagates_to_new_state() {
        let assets = Assets::new();
        let idle = Sprite::plain(frames(0, 2)).unwrap();
        let run = Sprite::directional(frames(10, 2), frames(20, 2), 0).unwrap();
        let mut sheet = SpriteSheet::new(vec![idle, run]).unwrap();

        sheet.set_reverse(true);
        sheet.set_state(1, &assets).unwrap();
        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(21));
        sheet.set_reverse(false);
        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(10));
    }

    #[test]
    fn test_from_data_map_resolves_lazily() {
        let mut map = DataMap::new(Package::CORE_ID);
        map.insert("states", Value::Byte(2));
        map.insert("state0", Value::Sprite(SpriteReference::new(0, "idle")));
        map.insert("state1", Value::Sprite(SpriteReference::new(0, "walk")));

        let early = assets_with(&[("idle", Sprite::plain(frames(0, 2)).unwrap())]);
        let mut sheet = SpriteSheet::from_data_map(&map, &early).unwrap();
        assert_eq!(sheet.len(), 2);
        assert!(matches!(
            sheet.set_state(1, &early),
            Err(CoreError::UnregisteredSprite { .. })
        ));

        let late = assets_with(&[
            ("idle", Sprite::plain(frames(0, 2)).unwrap()),
            ("walk", Sprite::plain(frames(5, 2)).unwrap()),
        ]);
        sheet.set_state(1, &late).unwrap();
        assert_eq!(sheet.next_frame(&late).unwrap(), Bitmap(5));
    }

    #[test]
    fn test_sheets_do_not_share_playback() {
        let assets = assets_with(&[("idle", Sprite::plain(frames(0, 3)).unwrap())]);
        let mut map = DataMap::new(Package::CORE_ID);
        map.insert("states", Value::Byte(1));
        map.insert("state0", Value::Sprite(SpriteReference::new(0, "idle")));

        let mut first = SpriteSheet::from_data_map(&map, &assets).unwrap();
        let mut second = SpriteSheet::from_data_map(&map, &assets).unwrap();
        first.next_frame(&assets).unwrap();
        first.next_frame(&assets).unwrap();
        assert_eq!(second.next_frame(&assets).unwrap(), Bitmap(0));
    }

    #[test]
    fn test_unload_and_reload() {
        let assets = assets_with(&[("idle", Sprite::plain(frames(0, 2)).unwrap())]);
        let mut map = DataMap::new(Package::CORE_ID);
        map.insert("states", Value::Byte(1));
        map.insert("state0", Value::Sprite(SpriteReference::new(0, "idle")));
        let mut sheet = SpriteSheet::from_data_map(&map, &assets).unwrap();

        sheet.next_frame(&assets).unwrap();
        assert!(sheet.unload(0));
        assert!(!sheet.unload(0));
        assert_eq!(sheet.next_frame(&assets).unwrap(), Bitmap(0));
    }

    #[test]
    fn test_missing_state_keys() {
        let mut map = DataMap::new(Package::CORE_ID);
        map.insert("states", Value::Byte(2));
        match SpriteSheet::from_data_map(&map, &Assets::new()) {
            Err(CoreError::MissingProperty(missing)) => {
                assert_eq!(missing, vec!["state0", "state1"]);
            }
            other => panic!("expected MissingProperty, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_display() {
        assert_eq!(SpriteReference::new(3, "idle").to_string(), "3:idle");
    }
}

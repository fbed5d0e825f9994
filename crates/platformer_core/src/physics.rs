//! Per-frame player physics.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assets::Assets;
use crate::data::DataMap;
use crate::error::Result;
use crate::host::ResourceSource;
use crate::input::KeyMap;
use crate::object::{Player, state};
use crate::package::PackageTable;

/// Physics constants, loaded once at startup and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Horizontal acceleration per unit of input while grounded.
    pub movement: f32,
    /// Horizontal push per unit of input when a jump starts.
    pub jump_arc: f32,
    /// Added to vertical velocity every airborne frame.
    pub gravity: f32,
    /// Upward velocity of a jump.
    pub jump_force: f32,
    /// Multiplier applied to horizontal velocity every grounded frame.
    pub friction: f32,
    /// Render scale applied to the player's height when finding the floor.
    pub render_scale: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            movement: 0.5,
            jump_arc: 1.0,
            gravity: 0.8,
            jump_force: 14.0,
            friction: 0.85,
            render_scale: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Read the constants from float properties `movement`, `forcejumpx`,
    /// `gravity`, `forcejumpy`, `friction` and the optional `scale`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`](crate::CoreError::MissingProperty)
    /// naming every absent key, or a property type error.
    pub fn from_data_map(map: &DataMap) -> Result<Self> {
        map.check_for_set(&["movement", "forcejumpx", "gravity", "forcejumpy", "friction"])?;
        let render_scale = if map.has("scale") {
            map.float("scale")?
        } else {
            1.0
        };
        Ok(Self {
            movement: map.float("movement")?,
            jump_arc: map.float("forcejumpx")?,
            gravity: map.float("gravity")?,
            jump_force: map.float("forcejumpy")?,
            friction: map.float("friction")?,
            render_scale,
        })
    }

    /// Load the constants from a property resource.
    ///
    /// # Errors
    ///
    /// A resource, parse or property error.
    pub fn load(
        source: &dyn ResourceSource,
        path: &str,
        package: u8,
        packages: &PackageTable,
    ) -> Result<Self> {
        let map = DataMap::load(package, source, path, packages)?;
        let config = Self::from_data_map(&map)?;
        info!(path, ?config, "loaded physics constants");
        Ok(config)
    }
}

/// Advance the player by one frame.
///
/// Velocity is settled first (ground contact, landing, gravity, jump), then
/// applied once. The animation state and facing follow from the result.
///
/// # Errors
///
/// A sprite resolution error while switching animation state.
pub fn step(
    config: &PhysicsConfig,
    player: &mut Player,
    keys: &KeyMap,
    floor: f32,
    assets: &Assets,
) -> Result<()> {
    let horizontal = keys.horizontal();
    let input = horizontal as f32;
    let body = player.body_mut();

    let floor_pos = floor - body.height() * config.render_scale;
    let y = body.position().y;
    let grounded = y >= floor_pos;

    if grounded {
        body.velocity.y = 0.0;
        body.velocity.x += input * config.movement;
    } else if y + body.velocity.y > floor_pos {
        body.velocity.y = floor_pos - y;
    } else {
        body.velocity.y += config.gravity;
    }

    if keys.jump() && grounded {
        body.velocity.y -= config.jump_force;
        body.velocity.x += input * config.jump_arc;
    }

    body.do_velocity();

    let next_state = if grounded {
        body.velocity.x *= config.friction;
        match horizontal.abs() {
            0 => state::IDLE,
            1 => state::WALK,
            _ => state::RUN,
        }
    } else {
        state::AIRBORNE
    };
    let vx = body.velocity.x;

    if vx > 0.0 {
        player.set_facing(false);
    } else if vx < 0.0 {
        player.set_facing(true);
    }
    player.set_state(next_state, assets)?;

    debug!(grounded, state = next_state, x = vx, "physics step");
    Ok(())
}

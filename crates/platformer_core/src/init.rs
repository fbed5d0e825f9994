//! Startup resource creation.
//!
//! Creation runs in four phases: textures, sprites, sheets and tiles. Each
//! phase runs its hooks at most once, however often it is requested. The
//! core package's hook is registered first; extensions append their own
//! with the `on_*` methods.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{DataMap, Value};
use crate::database::Database;
use crate::error::{CoreError, Result};
use crate::geometry::Tile;
use crate::host::{ImageLoader, ResourceSource};
use crate::object::Player;
use crate::package::Package;
use crate::render::{Sprite, SpriteSheet, Texture};

/// The host services a creation hook may use.
pub struct Loader<'a> {
    pub source: &'a dyn ResourceSource,
    pub images: &'a mut dyn ImageLoader,
}

impl<'a> Loader<'a> {
    pub fn new(source: &'a dyn ResourceSource, images: &'a mut dyn ImageLoader) -> Self {
        Self { source, images }
    }
}

/// A callback run by one creation phase.
pub type CreationHook = Box<dyn FnMut(&mut Database, &mut Loader<'_>) -> Result<()>>;

/// Resource paths of the core package, in load order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreAssets {
    /// Sprite definition files.
    pub sprites: Vec<String>,
    /// Texture images and the keys they are registered under.
    pub textures: Vec<(String, String)>,
    /// Tile definition files. Their order fixes the slots used by grid files.
    pub tiles: Vec<String>,
    /// The player's sprite sheet, or a map with `bounds` and `sprites`.
    pub player: String,
    /// Physics constants.
    pub controls: String,
    /// Grid file of the starting level.
    pub level: Option<String>,
}

impl Default for CoreAssets {
    fn default() -> Self {
        Self {
            sprites: ["idle", "walk", "run", "fall"]
                .iter()
                .map(|name| format!("asset/sprite/test/{name}.sdf"))
                .collect(),
            textures: ["ground", "grass"]
                .iter()
                .map(|name| (format!("asset/texture/default/{name}.png"), (*name).to_string()))
                .collect(),
            tiles: ["ground", "grass"]
                .iter()
                .map(|name| format!("asset/tile/default/{name}.dat"))
                .collect(),
            player: "asset/sprite/testplayer.ssf".to_string(),
            controls: "asset/testcontrols.dat".to_string(),
            level: None,
        }
    }
}

#[derive(Default)]
struct Phase {
    done: bool,
    hooks: Vec<CreationHook>,
}

impl Phase {
    fn run(&mut self, name: &'static str, db: &mut Database, loader: &mut Loader<'_>) -> Result<bool> {
        if self.done {
            debug!(phase = name, "already created");
            return Ok(false);
        }
        self.done = true;
        info!(phase = name, hooks = self.hooks.len(), "creating");
        for hook in &mut self.hooks {
            hook(&mut *db, &mut *loader)?;
        }
        info!(phase = name, "created");
        Ok(true)
    }
}

/// One-shot creation phases and their hooks.
#[derive(Default)]
pub struct Initialization {
    textures: Phase,
    sprites: Phase,
    sheets: Phase,
    tiles: Phase,
}

impl Initialization {
    /// Phases with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Phases that load the core package's resources from `core`.
    #[must_use]
    pub fn with_core(core: CoreAssets) -> Self {
        let mut init = Self::new();
        let CoreAssets {
            sprites,
            textures,
            tiles,
            player,
            ..
        } = core;

        init.on_textures(Box::new(move |db: &mut Database, loader: &mut Loader<'_>| {
            for (path, key) in &textures {
                load_texture(db, &mut *loader.images, Package::CORE_ID, path, key)?;
            }
            Ok(())
        }));
        init.on_sprites(Box::new(move |db: &mut Database, loader: &mut Loader<'_>| {
            for path in &sprites {
                load_sprite(db, loader.source, &mut *loader.images, Package::CORE_ID, path)?;
            }
            Ok(())
        }));
        init.on_sheets(Box::new(move |db: &mut Database, loader: &mut Loader<'_>| {
            prepare_player(db, loader.source, Package::CORE_ID, &player)
        }));
        init.on_tiles(Box::new(move |db: &mut Database, loader: &mut Loader<'_>| {
            for path in &tiles {
                load_tile(db, loader.source, Package::CORE_ID, path)?;
            }
            Ok(())
        }));
        init
    }

    pub fn on_textures(&mut self, hook: CreationHook) {
        self.textures.hooks.push(hook);
    }

    pub fn on_sprites(&mut self, hook: CreationHook) {
        self.sprites.hooks.push(hook);
    }

    pub fn on_sheets(&mut self, hook: CreationHook) {
        self.sheets.hooks.push(hook);
    }

    pub fn on_tiles(&mut self, hook: CreationHook) {
        self.tiles.hooks.push(hook);
    }

    /// Run the texture hooks unless they already ran. Returns whether they
    /// ran now.
    ///
    /// # Errors
    ///
    /// The first hook error. The phase still counts as created.
    pub fn create_textures(&mut self, db: &mut Database, loader: &mut Loader<'_>) -> Result<bool> {
        self.textures.run("textures", db, loader)
    }

    /// See [`Initialization::create_textures`].
    ///
    /// # Errors
    ///
    /// The first hook error.
    pub fn create_sprites(&mut self, db: &mut Database, loader: &mut Loader<'_>) -> Result<bool> {
        self.sprites.run("sprites", db, loader)
    }

    /// See [`Initialization::create_textures`].
    ///
    /// # Errors
    ///
    /// The first hook error.
    pub fn create_sheets(&mut self, db: &mut Database, loader: &mut Loader<'_>) -> Result<bool> {
        self.sheets.run("sheets", db, loader)
    }

    /// See [`Initialization::create_textures`].
    ///
    /// # Errors
    ///
    /// The first hook error.
    pub fn create_tiles(&mut self, db: &mut Database, loader: &mut Loader<'_>) -> Result<bool> {
        self.tiles.run("tiles", db, loader)
    }

    /// Whether every phase has run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.textures.done && self.sprites.done && self.sheets.done && self.tiles.done
    }
}

fn path_property<'m>(map: &'m DataMap, name: &str) -> Result<&'m str> {
    match map.get(name) {
        Some(Value::File(path) | Value::Str(path)) => Ok(path.as_str()),
        Some(_) => Err(CoreError::PropertyType {
            name: name.to_string(),
            expected: "file",
        }),
        None => Err(CoreError::MissingProperty(vec![name.to_string()])),
    }
}

/// Load a sprite definition and its frame images, and register the sprite
/// under the definition's `key`. Frames are read from `{path}{n}.png` and,
/// for directional sprites, `{path}{n}L.png`.
///
/// # Errors
///
/// A resource, image, property or registration error.
pub fn load_sprite(
    db: &mut Database,
    source: &dyn ResourceSource,
    images: &mut dyn ImageLoader,
    package: u8,
    path: &str,
) -> Result<String> {
    let mut map = DataMap::load(package, source, path, db.packages())?;
    map.check_for_set(&["path", "length", "key"])?;
    let frames = path_property(&map, "path")?.to_string();
    let length = map.byte("length")?;
    let directional = map.has("directional") && map.bool("directional")?;
    let key = map.str("key")?.to_string();

    for n in 0..length {
        let image = images.load_image(&format!("{frames}{n}.png"))?;
        map.insert(format!("frame{n}"), Value::Image(image));
    }
    if directional {
        for n in 0..length {
            let image = images.load_image(&format!("{frames}{n}L.png"))?;
            map.insert(format!("rframe{n}"), Value::Image(image));
        }
    }

    let sprite = Sprite::from_data_map(&mut map)?;
    db.add_sprite(package, key.clone(), sprite)?;
    info!(path, key = %key, frames = length, directional, "loaded sprite");
    Ok(key)
}

/// Load an image and register it as a texture under `key`.
///
/// # Errors
///
/// An image or registration error.
pub fn load_texture(
    db: &mut Database,
    images: &mut dyn ImageLoader,
    package: u8,
    path: &str,
    key: &str,
) -> Result<()> {
    let image = images.load_image(path)?;
    db.add_texture(package, key, Texture::new(image))?;
    info!(path, key, "loaded texture");
    Ok(())
}

/// Load a tile definition and append it to the package's tile batch.
///
/// # Errors
///
/// A resource, property or registration error.
pub fn load_tile(db: &mut Database, source: &dyn ResourceSource, package: u8, path: &str) -> Result<u8> {
    let map = DataMap::load(package, source, path, db.packages())?;
    let tile = Tile::from_data_map(&map)?;
    let slot = db.add_tile(package, tile)?;
    info!(path, slot, "loaded tile");
    Ok(slot)
}

/// Build the player and install it as the player singleton.
///
/// `path` is either a sprite sheet definition or a player definition
/// holding `bounds` and a `sprites` sheet path.
///
/// # Errors
///
/// A resource, property or sprite resolution error.
pub fn prepare_player(db: &mut Database, source: &dyn ResourceSource, package: u8, path: &str) -> Result<()> {
    let map = DataMap::load(package, source, path, db.packages())?;
    let player = if map.has("sprites") {
        Player::from_data_map(&map, source, db.packages(), db.assets())?
    } else {
        Player::new(SpriteSheet::from_data_map(&map, db.assets())?)
    };
    db.set_player(player)?;
    info!(path, "prepared player");
    Ok(())
}

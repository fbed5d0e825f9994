use platformer_math::{BoundingBox, Vec2};
use tracing::{debug, info};

use crate::assets::Assets;
use crate::error::{CoreError, Result};
use crate::host::{DrawSurface, ResourceSource};
use crate::identity::{Identifiable, IdentityNumber};

use super::{Tile, TileGrid};

/// Edge length of one grid cell in world units.
pub const TILE_SIZE: f32 = 32.0;

/// The level singleton. It owns exactly one grid and always lives at
/// [`IdentityNumber::LEVEL`].
#[derive(Debug, Clone)]
pub struct Level {
    grid: TileGrid,
}

impl Level {
    #[must_use]
    pub fn new(grid: TileGrid) -> Self {
        Self { grid }
    }

    /// Read a grid file and build a level from it.
    ///
    /// # Errors
    ///
    /// A resource error or any [`TileGrid::from_bytes`] error.
    pub fn load(
        source: &dyn ResourceSource,
        path: &str,
        package: u8,
        assets: &Assets,
    ) -> Result<Self> {
        let bytes = source.read(path)?;
        let grid = TileGrid::from_bytes(&bytes, package, assets)?;
        info!(path, width = grid.width(), height = grid.height(), "loaded level");
        Ok(Self::new(grid))
    }

    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Swap in another grid.
    pub fn replace_grid(&mut self, grid: TileGrid) -> TileGrid {
        std::mem::replace(&mut self.grid, grid)
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    /// The tile at a cell.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredTile`] if the cell is outside the grid or its
    /// tile is not registered.
    pub fn tile<'a>(&self, x: u16, y: u16, assets: &'a Assets) -> Result<&'a Tile> {
        let identity = self.grid.get(x, y).ok_or(CoreError::UnregisteredTile {
            package: self.grid.package(),
            slot: 0,
        })?;
        assets.tile_by_identity(identity)
    }

    /// Cells around `camera` (in cell units) that fall inside the grid:
    /// `floor(c - 1) <= i < ceil(c + 1)` on each axis.
    pub fn visible_cells(&self, camera: Vec2) -> impl Iterator<Item = (u16, u16)> + use<> {
        let xs = visible_range(camera.x, self.width());
        let ys = visible_range(camera.y, self.height());
        xs.flat_map(move |x| ys.clone().map(move |y| (x, y)))
    }

    /// Draw every visible tile that has an image.
    ///
    /// # Errors
    ///
    /// A lookup error for an unregistered tile or texture.
    pub fn render(&self, surface: &mut dyn DrawSurface, camera: Vec2, assets: &Assets) -> Result<()> {
        let mut drawn = 0usize;
        for (x, y) in self.visible_cells(camera) {
            let tile = self.tile(x, y, assets)?;
            if tile.is_air() {
                continue;
            }
            let Some(image) = tile.image() else {
                continue;
            };
            let bounds = BoundingBox::new(
                f32::from(x) * TILE_SIZE,
                f32::from(y) * TILE_SIZE,
                TILE_SIZE,
                TILE_SIZE,
            );
            surface.draw_image(image.resolve(assets)?, bounds);
            drawn += 1;
        }
        debug!(drawn, "rendered level");
        Ok(())
    }
}

fn visible_range(camera: f32, limit: u16) -> std::ops::Range<u16> {
    let start = (camera - 1.0).floor().max(0.0);
    let end = (camera + 1.0).ceil().min(f32::from(limit));
    if end <= start {
        return 0..0;
    }
    (start as u16)..(end as u16)
}

impl Identifiable for Level {
    fn identity(&self) -> IdentityNumber {
        IdentityNumber::LEVEL
    }

    fn set_identity(&mut self, identity: IdentityNumber) -> Result<()> {
        if identity == IdentityNumber::LEVEL {
            Ok(())
        } else {
            Err(CoreError::ImmutableIdentity("level"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileBehavior;
    use crate::host::{Bitmap, MemorySource};
    use crate::package::Package;
    use crate::render::{Texture, TextureReference};

    #[derive(Default)]
    struct Recorder {
        images: Vec<(Bitmap, BoundingBox)>,
    }

    impl DrawSurface for Recorder {
        fn draw_image(&mut self, image: Bitmap, bounds: BoundingBox) {
            self.images.push((image, bounds));
        }

        fn draw_line(&mut self, _from: Vec2, _to: Vec2) {}
    }

    fn assets() -> Assets {
        let mut assets = Assets::new();
        assets.register_package(Package::CORE_ID);
        assets.add_texture(0, "ground", Texture::new(Bitmap(40))).unwrap();
        assets
            .add_tile(
                0,
                Tile::new(TileBehavior::COLLIDE, Some(TextureReference::new(0, "ground"))),
            )
            .unwrap();
        assets
    }

    fn level(width: u16, height: u16) -> Level {
        let mut grid = TileGrid::empty(0, width, height);
        for x in 0..width {
            for y in 0..height {
                grid.set(x, y, 1);
            }
        }
        Level::new(grid)
    }

    #[test]
    fn test_visible_cells_clip_to_grid() {
        let level = level(10, 10);
        let cells: Vec<_> = level.visible_cells(Vec2::new(0.0, 0.0)).collect();
        assert_eq!(cells, vec![(0, 0)]);

        let cells: Vec<_> = level.visible_cells(Vec2::new(4.5, 2.0)).collect();
        assert_eq!(cells, vec![(3, 1), (3, 2), (4, 1), (4, 2), (5, 1), (5, 2)]);

        assert_eq!(level.visible_cells(Vec2::new(20.0, 0.0)).count(), 0);
        assert_eq!(level.visible_cells(Vec2::new(-5.0, 0.0)).count(), 0);
    }

    #[test]
    fn test_render_skips_air() {
        let assets = assets();
        let mut grid = TileGrid::empty(0, 4, 4);
        grid.set(2, 2, 1);
        let level = Level::new(grid);
        let mut surface = Recorder::default();

        level.render(&mut surface, Vec2::new(2.0, 2.0), &assets).unwrap();
        assert_eq!(
            surface.images,
            vec![(Bitmap(40), BoundingBox::new(64.0, 64.0, 32.0, 32.0))]
        );
    }

    #[test]
    fn test_load_from_source() {
        let assets = assets();
        let source = MemorySource::new().with("asset/level/one.lvl", vec![0, 2, 0, 1, 1, 0]);
        let level = Level::load(&source, "asset/level/one.lvl", 0, &assets).unwrap();
        assert_eq!(level.tile(0, 0, &assets).unwrap().behavior(), TileBehavior::COLLIDE);
        assert!(level.tile(1, 0, &assets).unwrap().is_air());
    }

    #[test]
    fn test_identity_is_fixed() {
        let mut level = level(1, 1);
        assert_eq!(level.identity(), IdentityNumber::LEVEL);
        assert!(level.set_identity(IdentityNumber::LEVEL).is_ok());
        assert!(matches!(
            level.set_identity(IdentityNumber::new(0, 5)),
            Err(CoreError::ImmutableIdentity("level"))
        ));
    }
}

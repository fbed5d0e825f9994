use crate::assets::Assets;
use crate::error::{CoreError, Result};
use crate::identity::ShortIdentity;

const HEADER_LEN: usize = 4;

/// A `width x height` grid of tile identities stored column by column.
///
/// File layout: big-endian `u16` width, big-endian `u16` height, then one
/// slot byte per cell with the outer loop over `x` and the inner over `y`.
/// Slot 0 is air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    package: u8,
    width: u16,
    height: u16,
    tiles: Vec<ShortIdentity>,
}

impl TileGrid {
    /// A grid of air.
    #[must_use]
    pub fn empty(package: u8, width: u16, height: u16) -> Self {
        Self {
            package,
            width,
            height,
            tiles: vec![ShortIdentity::AIR; usize::from(width) * usize::from(height)],
        }
    }

    /// Decode a grid file, resolving every slot in `package`'s tile batch.
    ///
    /// # Errors
    ///
    /// [`CoreError::TruncatedGrid`] if the data ends early, or
    /// [`CoreError::UnregisteredTile`] for a slot with no tile.
    pub fn from_bytes(bytes: &[u8], package: u8, assets: &Assets) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CoreError::TruncatedGrid {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        let width = u16::from_be_bytes([bytes[0], bytes[1]]);
        let height = u16::from_be_bytes([bytes[2], bytes[3]]);
        let cells = usize::from(width) * usize::from(height);
        let body = &bytes[HEADER_LEN..];
        if body.len() < cells {
            return Err(CoreError::TruncatedGrid {
                expected: HEADER_LEN + cells,
                actual: bytes.len(),
            });
        }

        let tiles = body[..cells]
            .iter()
            .map(|&slot| assets.tile(package, slot).map(|tile| tile.identity()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            package,
            width,
            height,
            tiles,
        })
    }

    /// Encode the grid in the file layout read by [`TileGrid::from_bytes`].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.tiles.len());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend(self.tiles.iter().map(|id| id.slot()));
        out
    }

    #[must_use]
    pub fn package(&self) -> u8 {
        self.package
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The tile identity at a cell, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<ShortIdentity> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles
            .get(usize::from(x) * usize::from(self.height) + usize::from(y))
            .copied()
    }

    /// Place a tile of this grid's package (or air) at a cell. Returns
    /// `false` outside the grid.
    pub fn set(&mut self, x: u16, y: u16, slot: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let identity = if slot == 0 {
            ShortIdentity::AIR
        } else {
            ShortIdentity::new(self.package, slot)
        };
        self.tiles[usize::from(x) * usize::from(self.height) + usize::from(y)] = identity;
        true
    }
}

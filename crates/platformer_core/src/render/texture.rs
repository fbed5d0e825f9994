//! Static textures and references to them.

use std::fmt;

use crate::assets::Assets;
use crate::error::Result;
use crate::host::Bitmap;

/// A single static image registered in a package's texture bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    image: Bitmap,
}

impl Texture {
    #[must_use]
    pub fn new(image: Bitmap) -> Self {
        Self { image }
    }

    #[must_use]
    pub fn image(&self) -> Bitmap {
        self.image
    }
}

/// A `package:key` pointer into a texture bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureReference {
    pub package: u8,
    pub key: String,
}

impl TextureReference {
    #[must_use]
    pub fn new(package: u8, key: impl Into<String>) -> Self {
        Self {
            package,
            key: key.into(),
        }
    }

    /// Look the texture up.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredTexture`](crate::CoreError::UnregisteredTexture)
    /// if nothing is registered under the key.
    pub fn resolve(&self, assets: &Assets) -> Result<Bitmap> {
        assets.texture(self.package, &self.key).map(Texture::image)
    }
}

impl fmt::Display for TextureReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.key)
    }
}

//! Headless stand-ins for the image decoder and the draw surface.

use std::collections::HashMap;

use platformer_core::{Bitmap, DrawSurface, ImageLoader, ResourceSource, Result};
use platformer_math::{BoundingBox, Vec2};
use tracing::trace;

/// Hands out one bitmap handle per distinct image path.
///
/// Images are read from the resource source to make sure they exist but are
/// not decoded.
pub struct InternedImages<'a> {
    source: &'a dyn ResourceSource,
    handles: HashMap<String, Bitmap>,
}

impl<'a> InternedImages<'a> {
    pub fn new(source: &'a dyn ResourceSource) -> Self {
        Self {
            source,
            handles: HashMap::new(),
        }
    }

    /// Number of distinct images loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl ImageLoader for InternedImages<'_> {
    fn load_image(&mut self, path: &str) -> Result<Bitmap> {
        if let Some(&handle) = self.handles.get(path) {
            return Ok(handle);
        }
        let bytes = self.source.read(path)?;
        let handle = Bitmap(self.handles.len() as u32);
        trace!(path, bytes = bytes.len(), handle = handle.0, "interned image");
        self.handles.insert(path.to_string(), handle);
        Ok(handle)
    }
}

/// Counts draw calls instead of drawing.
#[derive(Debug, Default)]
pub struct CountingSurface {
    pub images: u64,
    pub lines: u64,
}

impl DrawSurface for CountingSurface {
    fn draw_image(&mut self, image: Bitmap, bounds: BoundingBox) {
        trace!(handle = image.0, x = bounds.x(), y = bounds.y(), "draw image");
        self.images += 1;
    }

    fn draw_line(&mut self, _from: Vec2, _to: Vec2) {
        self.lines += 1;
    }
}

#[cfg(test)]
mod tests {
    use platformer_core::{CoreError, DirectorySource};

    use super::*;

    #[test]
    fn test_images_are_interned_by_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("asset")).unwrap();
        std::fs::write(dir.path().join("asset/a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("asset/b.png"), b"b").unwrap();
        let source = DirectorySource::new(dir.path());
        let mut images = InternedImages::new(&source);

        let a = images.load_image("asset/a.png").unwrap();
        let b = images.load_image("asset/b.png").unwrap();
        assert_ne!(a, b);
        assert_eq!(images.load_image("asset/a.png").unwrap(), a);
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        let mut images = InternedImages::new(&source);
        assert!(matches!(
            images.load_image("asset/none.png"),
            Err(CoreError::Resource { .. })
        ));
    }
}

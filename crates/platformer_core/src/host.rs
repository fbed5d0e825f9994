//! Interfaces to the collaborators that live outside the core: the
//! resource store, the image decoder and the draw surface.
//!
//! Resource paths are relative and `/`-separated (`asset/tile/ground.dat`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use platformer_math::{BoundingBox, Vec2};

use crate::error::{CoreError, Result};

/// An opaque handle to an image decoded and owned by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmap(pub u32);

/// Read-only access to named resources.
pub trait ResourceSource {
    /// Read a resource in full.
    ///
    /// # Errors
    ///
    /// [`CoreError::Resource`] if the resource is missing or unreadable.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Read a resource as UTF-8 text.
    ///
    /// # Errors
    ///
    /// [`CoreError::Resource`] if the resource is missing, unreadable or not
    /// valid UTF-8.
    fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| CoreError::Resource {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}

/// Resources stored under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The on-disk location of a resource path.
    #[must_use]
    pub fn locate(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl ResourceSource for DirectorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(self.locate(path)).map_err(|source| CoreError::Resource {
            path: path.to_string(),
            source,
        })
    }
}

/// Resources held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resource, replacing any previous content.
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl ResourceSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| CoreError::Resource {
            path: path.to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// Decodes image resources into host bitmaps.
pub trait ImageLoader {
    /// # Errors
    ///
    /// [`CoreError::Resource`] if the image cannot be read or decoded.
    fn load_image(&mut self, path: &str) -> Result<Bitmap>;
}

/// The host's render target for one frame.
pub trait DrawSurface {
    /// Draw `image` stretched into `bounds`.
    fn draw_image(&mut self, image: Bitmap, bounds: BoundingBox);

    /// Draw a debug line.
    fn draw_line(&mut self, from: Vec2, to: Vec2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_read() {
        let source = MemorySource::new().with("asset/a.dat", "float gravity 1.5");
        assert_eq!(source.read_text("asset/a.dat").unwrap(), "float gravity 1.5");
        assert!(matches!(
            source.read("asset/b.dat"),
            Err(CoreError::Resource { path, .. }) if path == "asset/b.dat"
        ));
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let source = MemorySource::new().with("bin", vec![0xFF, 0xFE]);
        assert!(source.read_text("bin").is_err());
    }

    #[test]
    fn test_directory_source_reads_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("asset").join("tile")).unwrap();
        std::fs::write(dir.path().join("asset").join("tile").join("g.dat"), b"int behavior 1").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.read_text("asset/tile/g.dat").unwrap(), "int behavior 1");
        assert!(source.read("asset/tile/missing.dat").is_err());
    }
}

//! Package-scoped resource tables.
//!
//! A [`Bundle`] maps string keys to sprites or textures. A [`SmallBatch`]
//! holds up to 256 tiles addressed by a one-byte slot; slots are assigned in
//! insertion order, and tile grid files refer to tiles by slot, so the order
//! in which a package adds its tiles is part of its file format.

use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// An unbounded string-keyed table owned by one package.
#[derive(Debug, Clone)]
pub struct Bundle<T> {
    package: u8,
    entries: HashMap<String, T>,
}

impl<T> Bundle<T> {
    #[must_use]
    pub fn new(package: u8) -> Self {
        Self {
            package,
            entries: HashMap::new(),
        }
    }

    /// The owning package.
    #[must_use]
    pub fn package(&self) -> u8 {
        self.package
    }

    /// Insert `value` under `key`. Returns `false` and leaves the bundle
    /// untouched if the key is already used.
    pub fn add(&mut self, key: impl Into<String>, value: T) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fixed-capacity table of at most 256 entries indexed by slot.
#[derive(Debug, Clone)]
pub struct SmallBatch<T> {
    package: u8,
    kind: &'static str,
    entries: Vec<T>,
}

impl<T> SmallBatch<T> {
    /// Maximum number of entries.
    pub const CAPACITY: usize = 0x100;

    /// Create an empty batch. `kind` names the stored resource in overflow
    /// errors.
    #[must_use]
    pub fn new(package: u8, kind: &'static str) -> Self {
        Self {
            package,
            kind,
            entries: Vec::new(),
        }
    }

    /// Create a batch whose slot 0 already holds `first`.
    #[must_use]
    pub fn seeded(package: u8, kind: &'static str, first: T) -> Self {
        Self {
            package,
            kind,
            entries: vec![first],
        }
    }

    #[must_use]
    pub fn package(&self) -> u8 {
        self.package
    }

    /// Append `value` and return its slot.
    ///
    /// # Errors
    ///
    /// [`CoreError::SmallBatchOverflow`] once 256 entries are stored.
    pub fn add(&mut self, value: T) -> Result<u8> {
        if self.entries.len() >= Self::CAPACITY {
            return Err(CoreError::SmallBatchOverflow {
                package: self.package,
                kind: self.kind,
            });
        }
        let slot = self.entries.len() as u8;
        self.entries.push(value);
        Ok(slot)
    }

    #[must_use]
    pub fn get(&self, slot: u8) -> Option<&T> {
        self.entries.get(slot as usize)
    }

    pub(crate) fn get_mut(&mut self, slot: u8) -> Option<&mut T> {
        self.entries.get_mut(slot as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

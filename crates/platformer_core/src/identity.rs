//! Identity numbers for registry objects and tiles.
//!
//! An [`IdentityNumber`] addresses a live object as `0xPPRRRR`: one byte of
//! package identifier above a 16-bit reference. A [`ShortIdentity`]
//! addresses a tile as `0xPPRR`: package above an 8-bit slot. The packing is
//! part of the on-disk format and must not change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 24-bit composite key `(package, reference)` stored in a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityNumber(u32);

impl IdentityNumber {
    /// Reserved for the player singleton.
    pub const PLAYER: Self = Self(0);

    /// Reserved for the level singleton.
    pub const LEVEL: Self = Self(1);

    /// Number of distinct references inside one package.
    pub const REFERENCES_PER_PACKAGE: u32 = 0x1_0000;

    /// Build an identity from its package and reference.
    #[must_use]
    pub const fn new(package: u8, reference: u16) -> Self {
        Self(package as u32 * 0x1_0000 + reference as u32)
    }

    /// Decode a packed identity. Bits above the package byte are discarded.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & 0x00FF_FFFF)
    }

    /// Returns the packed `package * 0x10000 + reference` value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn package(self) -> u8 {
        (self.0 / 0x1_0000) as u8
    }

    #[must_use]
    pub const fn reference(self) -> u16 {
        (self.0 % 0x1_0000) as u16
    }

    /// Returns `true` for the identities held back for singletons.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.0 == Self::PLAYER.0 || self.0 == Self::LEVEL.0
    }
}

impl fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// A 16-bit composite key `(package, slot)` used for tiles.
///
/// Slot 0 of every package is the air tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShortIdentity(u16);

impl ShortIdentity {
    /// The air tile of the core package.
    pub const AIR: Self = Self(0);

    #[must_use]
    pub const fn new(package: u8, slot: u8) -> Self {
        Self(package as u16 * 0x100 + slot as u16)
    }

    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn package(self) -> u8 {
        (self.0 / 0x100) as u8
    }

    #[must_use]
    pub const fn slot(self) -> u8 {
        (self.0 % 0x100) as u8
    }

    #[must_use]
    pub const fn is_air(self) -> bool {
        self.slot() == 0
    }
}

impl fmt::Display for ShortIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Anything the registry can address by an [`IdentityNumber`].
pub trait Identifiable {
    /// Returns the current identity.
    fn identity(&self) -> IdentityNumber;

    /// Move the object to a new identity.
    ///
    /// # Errors
    ///
    /// Singletons refuse any identity other than their fixed one with
    /// [`CoreError::ImmutableIdentity`](crate::CoreError::ImmutableIdentity).
    fn set_identity(&mut self, identity: IdentityNumber) -> crate::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_packing() {
        let id = IdentityNumber::new(0x12, 0x3456);
        assert_eq!(id.raw(), 0x12_3456);
        assert_eq!(id.package(), 0x12);
        assert_eq!(id.reference(), 0x3456);
        assert_eq!(IdentityNumber::from_raw(0x12_3456), id);
    }

    #[test]
    fn test_identity_from_raw_masks_high_byte() {
        let id = IdentityNumber::from_raw(0xFF01_0002);
        assert_eq!(id.package(), 0x01);
        assert_eq!(id.reference(), 0x0002);
    }

    #[test]
    fn test_reserved_identities() {
        assert!(IdentityNumber::PLAYER.is_reserved());
        assert!(IdentityNumber::LEVEL.is_reserved());
        assert!(!IdentityNumber::new(0, 2).is_reserved());
        // Reference 0 in another package is an ordinary identity.
        assert!(!IdentityNumber::new(1, 0).is_reserved());
    }

    #[test]
    fn test_identity_display_is_hex() {
        assert_eq!(IdentityNumber::new(1, 0xAB).to_string(), "100AB");
    }

    #[test]
    fn test_short_identity_packing() {
        let id = ShortIdentity::new(3, 7);
        assert_eq!(id.raw(), 0x0307);
        assert_eq!(id.package(), 3);
        assert_eq!(id.slot(), 7);
        assert!(!id.is_air());
        assert!(ShortIdentity::new(9, 0).is_air());
        assert_eq!(ShortIdentity::from_raw(0x0307), id);
    }
}

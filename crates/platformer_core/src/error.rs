//! Error types for the runtime core.

use crate::identity::IdentityNumber;

/// Convenience alias used throughout the crate.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Errors raised by the registry, resource maps, animation and level code.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No object is registered at the identity.
    #[error("no object registered at identity {0}")]
    UnregisteredObject(IdentityNumber),

    /// The package identifier was never registered.
    #[error("package {0:#04X} is not registered")]
    UnregisteredPackage(u8),

    /// No package carries the name.
    #[error("no package named '{0}'")]
    UnregisteredPackageName(String),

    /// A package with this name already exists.
    #[error("package name '{0}' is already taken")]
    PackageNameOverride(String),

    /// A package with this identifier already exists.
    #[error("package identifier {0:#04X} is already registered")]
    PackageOverride(u8),

    /// All one-byte package identifiers are in use.
    #[error("no package identifiers left")]
    PackageLimit,

    /// A reserved identity was requested for an object that may not hold it.
    #[error("identity {0} is reserved")]
    IdentityOverride(IdentityNumber),

    /// A singleton was asked to change its fixed identity.
    #[error("the identity of a {0} cannot be changed")]
    ImmutableIdentity(&'static str),

    /// Every reference inside the package is occupied.
    #[error("package {0:#04X} has no free identities")]
    IdentitySpaceExhausted(u8),

    /// Required properties are absent from a data map.
    #[error("missing properties: {}", .0.join(", "))]
    MissingProperty(Vec<String>),

    /// A property exists but holds a different type.
    #[error("property '{name}' is not a {expected}")]
    PropertyType {
        name: String,
        expected: &'static str,
    },

    /// A line with a known type tag could not be parsed.
    #[error("malformed property line '{line}': {reason}")]
    MalformedProperty { line: String, reason: String },

    /// A data map that has already been consumed was handed to a constructor.
    #[error("data map has already been consumed")]
    ConsumedDataMap,

    /// A 256-slot tile batch is full.
    #[error("{kind} batch of package {package:#04X} is full")]
    SmallBatchOverflow { package: u8, kind: &'static str },

    /// The key is already used in a bundle.
    #[error("{kind} {package}:{key} is already registered")]
    DuplicateResource {
        kind: &'static str,
        package: u8,
        key: String,
    },

    #[error("unregistered sprite {package}:{key}")]
    UnregisteredSprite { package: u8, key: String },

    #[error("unregistered texture {package}:{key}")]
    UnregisteredTexture { package: u8, key: String },

    #[error("unregistered tile {package}:{slot}")]
    UnregisteredTile { package: u8, slot: u8 },

    /// A sprite sheet state outside the sheet was selected.
    #[error("state {state} is out of range for a sheet of {states} states")]
    InvalidState { state: u8, states: usize },

    /// A sprite was built without frames.
    #[error("sprite has no frames")]
    EmptySprite,

    /// A directional sprite has a different number of reverse frames.
    #[error("sprite has {forward} frames but {reverse} reverse frames")]
    FrameCountMismatch { forward: usize, reverse: usize },

    /// A tile grid file ended early.
    #[error("tile grid is truncated: expected {expected} bytes, found {actual}")]
    TruncatedGrid { expected: usize, actual: usize },

    /// A frame was requested before resource creation finished.
    #[error("{0} has not been created")]
    NotInitialized(&'static str),

    /// A resource could not be read.
    #[error("failed to read resource '{path}': {source}")]
    Resource {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

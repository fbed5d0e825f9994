//! Packages: the namespaces that own identities and resources.
//!
//! The core package is identifier 0 and named `core`. Extensions allocate
//! further packages through [`PackageTable::create`]; identifiers are handed
//! out sequentially and packages are never removed.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CoreError, Result};

/// A registered namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Package {
    identifier: u8,
    name: String,
}

impl Package {
    /// Identifier of the core package.
    pub const CORE_ID: u8 = 0;

    /// Name of the core package.
    pub const CORE_NAME: &'static str = "core";

    #[must_use]
    pub fn new(identifier: u8, name: impl Into<String>) -> Self {
        Self {
            identifier,
            name: name.into(),
        }
    }

    /// The one-byte identifier.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.identifier
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Process-wide package table indexed by identifier and by name.
#[derive(Debug)]
pub struct PackageTable {
    by_id: Vec<Option<Package>>,
    by_name: HashMap<String, u8>,
    core: Package,
    next_id: u16,
}

impl PackageTable {
    /// Create a table holding only the core package.
    #[must_use]
    pub fn new() -> Self {
        let core = Package::new(Package::CORE_ID, Package::CORE_NAME);
        let mut by_id = vec![None; 0x100];
        by_id[Package::CORE_ID as usize] = Some(core.clone());
        let mut by_name = HashMap::new();
        by_name.insert(Package::CORE_NAME.to_string(), Package::CORE_ID);
        Self {
            by_id,
            by_name,
            core,
            next_id: 1,
        }
    }

    /// Allocate the next identifier and register a package under `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::PackageNameOverride`] if the name is taken,
    /// [`CoreError::PackageLimit`] once all 255 extension identifiers are used.
    pub fn create(&mut self, name: &str) -> Result<Package> {
        if self.by_name.contains_key(name) {
            return Err(CoreError::PackageNameOverride(name.to_string()));
        }
        // Skip identifiers that were claimed explicitly through `register`.
        while self.next_id <= 0xFF && self.by_id[self.next_id as usize].is_some() {
            self.next_id += 1;
        }
        if self.next_id > 0xFF {
            return Err(CoreError::PackageLimit);
        }
        let package = Package::new(self.next_id as u8, name);
        self.next_id += 1;
        self.register(package.clone())?;
        Ok(package)
    }

    /// Register a package with an explicit identifier.
    ///
    /// # Errors
    ///
    /// [`CoreError::PackageOverride`] if the identifier is taken,
    /// [`CoreError::PackageNameOverride`] if the name is taken.
    pub fn register(&mut self, package: Package) -> Result<()> {
        if self.by_id[package.id() as usize].is_some() {
            return Err(CoreError::PackageOverride(package.id()));
        }
        if self.by_name.contains_key(package.name()) {
            return Err(CoreError::PackageNameOverride(package.name().to_string()));
        }
        let id = package.id();
        debug!(id, name = package.name(), "registered package");
        self.by_name.insert(package.name().to_string(), id);
        self.by_id[id as usize] = Some(package);
        Ok(())
    }

    /// Look a package up by identifier.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackage`] if nothing is registered there.
    pub fn get(&self, id: u8) -> Result<&Package> {
        self.by_id[id as usize]
            .as_ref()
            .ok_or(CoreError::UnregisteredPackage(id))
    }

    /// Look a package up by name.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnregisteredPackageName`] if no package has the name.
    pub fn by_name(&self, name: &str) -> Result<&Package> {
        self.by_name
            .get(name)
            .and_then(|&id| self.by_id[id as usize].as_ref())
            .ok_or_else(|| CoreError::UnregisteredPackageName(name.to_string()))
    }

    /// Resolve a package written either as its decimal identifier or its
    /// name, as used by `pkg:key` references.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`get`](Self::get) or [`by_name`](Self::by_name).
    pub fn resolve(&self, token: &str) -> Result<&Package> {
        match token.parse::<u8>() {
            Ok(id) => self.get(id),
            Err(_) => self.by_name(token),
        }
    }

    #[must_use]
    pub fn is_registered(&self, id: u8) -> bool {
        self.by_id[id as usize].is_some()
    }

    /// The core package.
    #[must_use]
    pub fn core(&self) -> &Package {
        &self.core
    }

    /// Returns the number of registered packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for PackageTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_package_registered() {
        let table = PackageTable::new();
        assert_eq!(table.core().id(), 0);
        assert_eq!(table.core().name(), "core");
        assert_eq!(table.by_name("core").unwrap().id(), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_create_allocates_sequential_ids() {
        let mut table = PackageTable::new();
        let a = table.create("alpha").unwrap();
        let b = table.create("beta").unwrap();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(table.get(2).unwrap().name(), "beta");
    }

    #[test]
    fn test_create_rejects_taken_name() {
        let mut table = PackageTable::new();
        table.create("alpha").unwrap();
        assert!(matches!(
            table.create("alpha"),
            Err(CoreError::PackageNameOverride(name)) if name == "alpha"
        ));
        assert!(matches!(
            table.create("core"),
            Err(CoreError::PackageNameOverride(_))
        ));
    }

    #[test]
    fn test_register_rejects_taken_id() {
        let mut table = PackageTable::new();
        assert!(matches!(
            table.register(Package::new(0, "other")),
            Err(CoreError::PackageOverride(0))
        ));
    }

    #[test]
    fn test_register_explicit_package_is_found() {
        let mut table = PackageTable::new();
        table.register(Package::new(7, "seven")).unwrap();
        assert_eq!(table.get(7).unwrap().name(), "seven");
        assert_eq!(table.by_name("seven").unwrap().id(), 7);
        assert!(table.is_registered(7));
    }

    #[test]
    fn test_create_skips_explicit_ids() {
        let mut table = PackageTable::new();
        table.register(Package::new(1, "pinned")).unwrap();
        let next = table.create("fresh").unwrap();
        assert_eq!(next.id(), 2);
    }

    #[test]
    fn test_package_limit() {
        let mut table = PackageTable::new();
        for n in 1..=255 {
            table.create(&format!("pkg{n}")).unwrap();
        }
        assert!(matches!(table.create("one-too-many"), Err(CoreError::PackageLimit)));
    }

    #[test]
    fn test_lookup_errors() {
        let table = PackageTable::new();
        assert!(matches!(table.get(9), Err(CoreError::UnregisteredPackage(9))));
        assert!(matches!(
            table.by_name("missing"),
            Err(CoreError::UnregisteredPackageName(_))
        ));
    }

    #[test]
    fn test_resolve_by_number_or_name() {
        let mut table = PackageTable::new();
        table.create("extra").unwrap();
        assert_eq!(table.resolve("1").unwrap().name(), "extra");
        assert_eq!(table.resolve("extra").unwrap().id(), 1);
        assert_eq!(table.resolve("0").unwrap().name(), "core");
    }
}

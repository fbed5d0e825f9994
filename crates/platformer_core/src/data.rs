//! Typed key-value property maps loaded from text resources.
//!
//! Each line of a property file reads `<tag> <name> <value>`:
//!
//! ```text
//! byte length 4
//! bool timed true
//! rect bounds 32,48
//! sprite state0 core:idle
//! ```
//!
//! Lines with an unknown tag are dropped. Once a [`DataMap`] is locked,
//! further inserts are silently ignored.

use std::collections::HashMap;
use std::fmt::Write as _;

use platformer_math::{BoundingBox, Vec2};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::host::{Bitmap, ResourceSource};
use crate::identity::IdentityNumber;
use crate::package::PackageTable;
use crate::render::{SpriteReference, TextureReference};

/// Every type tag understood by the parser.
pub const TAGS: [&str; 15] = [
    "behavior", "bool", "byte", "dat", "double", "file", "float", "int", "point", "rect", "sheet",
    "sprite", "str", "texture", "vec",
];

/// A deserialized property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Double(f64),
    Float(f32),
    Int(i32),
    Str(String),
    /// Path of another resource.
    File(String),
    Point(Vec2),
    /// Only the size is stored in text form; the corner is the origin.
    Rect(BoundingBox),
    Vec(Vec2),
    Sprite(SpriteReference),
    Texture(TextureReference),
    /// Path of a sprite sheet property file.
    Sheet(String),
    /// Path of a nested property file.
    Dat(String),
    /// Identity of a behavior object.
    Behavior(IdentityNumber),
    /// A decoded image placed into the map by a loader. Has no text form.
    Image(Bitmap),
}

impl Value {
    /// The type tag this value is written with.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::File(_) => "file",
            Value::Point(_) => "point",
            Value::Rect(_) => "rect",
            Value::Vec(_) => "vec",
            Value::Sprite(_) => "sprite",
            Value::Texture(_) => "texture",
            Value::Sheet(_) => "sheet",
            Value::Dat(_) => "dat",
            Value::Behavior(_) => "behavior",
            Value::Image(_) => "image",
        }
    }

    /// Render the value in its text form, or `None` for in-memory values.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        Some(match self {
            Value::Bool(v) => v.to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Str(v) | Value::File(v) | Value::Sheet(v) | Value::Dat(v) => v.clone(),
            Value::Point(p) | Value::Vec(p) => format!("{},{}", p.x, p.y),
            Value::Rect(r) => format!("{},{}", r.width(), r.height()),
            Value::Sprite(r) => r.to_string(),
            Value::Texture(r) => r.to_string(),
            Value::Behavior(id) => format!("0x{id}"),
            Value::Image(_) => return None,
        })
    }
}

/// One undeserialized line: a tag, a name and the raw value text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub tag: String,
    pub name: String,
    pub raw: String,
}

impl Property {
    /// Split a line into tag, name and value.
    ///
    /// Returns `Ok(None)` for blank lines and for unknown tags.
    ///
    /// # Errors
    ///
    /// [`CoreError::MalformedProperty`] if a known tag lacks a name or value.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let mut parts = line.splitn(3, char::is_whitespace);
        let tag = parts.next().unwrap_or_default();
        if !TAGS.contains(&tag) {
            debug!(tag, line, "dropping property with unknown tag");
            return Ok(None);
        }
        let name = parts.next().unwrap_or_default();
        let raw = parts.next().map(str::trim).unwrap_or_default();
        if name.is_empty() || raw.is_empty() {
            return Err(malformed(line, "expected '<tag> <name> <value>'"));
        }
        Ok(Some(Self {
            tag: tag.to_string(),
            name: name.to_string(),
            raw: raw.to_string(),
        }))
    }

    /// Convert the raw text into a typed [`Value`].
    ///
    /// # Errors
    ///
    /// [`CoreError::MalformedProperty`] if the text does not fit the tag, or
    /// a package lookup error for a reference to an unknown package.
    pub fn deserialize(&self, packages: &PackageTable) -> Result<Value> {
        let raw = self.raw.as_str();
        let value = match self.tag.as_str() {
            "bool" => match raw {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(self.malformed("expected 'true' or 'false'")),
            },
            "byte" => Value::Byte(self.number(raw)?),
            "double" => Value::Double(self.number(raw)?),
            "float" => Value::Float(self.number(raw)?),
            "int" => Value::Int(self.number(raw)?),
            "str" => Value::Str(raw.to_string()),
            "file" => Value::File(raw.to_string()),
            "sheet" => Value::Sheet(raw.to_string()),
            "dat" => Value::Dat(raw.to_string()),
            "point" => Value::Point(self.pair(raw)?),
            "vec" => Value::Vec(self.pair(raw)?),
            "rect" => {
                let size = self.pair(raw)?;
                Value::Rect(BoundingBox::from_size(size.x, size.y))
            }
            "sprite" => {
                let (package, key) = self.reference(raw, packages)?;
                Value::Sprite(SpriteReference::new(package, key))
            }
            "texture" => {
                let (package, key) = self.reference(raw, packages)?;
                Value::Texture(TextureReference::new(package, key))
            }
            "behavior" => {
                let parsed = match raw.strip_prefix("0x") {
                    Some(hex) => u32::from_str_radix(hex, 16),
                    None => raw.parse::<u32>(),
                };
                let id = parsed.map_err(|e| self.malformed(&e.to_string()))?;
                Value::Behavior(IdentityNumber::from_raw(id))
            }
            _ => return Err(self.malformed("unknown tag")),
        };
        Ok(value)
    }

    fn number<T>(&self, raw: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| self.malformed(&e.to_string()))
    }

    fn pair(&self, raw: &str) -> Result<Vec2> {
        let Some((x, y)) = raw.split_once(',') else {
            return Err(self.malformed("expected 'x,y'"));
        };
        Ok(Vec2::new(self.number(x)?, self.number(y)?))
    }

    fn reference(&self, raw: &str, packages: &PackageTable) -> Result<(u8, String)> {
        let Some((package, key)) = raw.split_once(':') else {
            return Err(self.malformed("expected 'package:key'"));
        };
        let package = packages.resolve(package.trim())?;
        Ok((package.id(), key.trim().to_string()))
    }

    fn malformed(&self, reason: &str) -> CoreError {
        malformed(&format!("{} {} {}", self.tag, self.name, self.raw), reason)
    }
}

fn malformed(line: &str, reason: &str) -> CoreError {
    CoreError::MalformedProperty {
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

/// A lockable bag of named, typed properties owned by one package.
#[derive(Debug, Clone)]
pub struct DataMap {
    package: u8,
    props: HashMap<String, Value>,
    locked: bool,
}

impl DataMap {
    /// Create an empty, unlocked map.
    #[must_use]
    pub fn new(package: u8) -> Self {
        Self {
            package,
            props: HashMap::new(),
            locked: false,
        }
    }

    /// Parse property lines.
    ///
    /// # Errors
    ///
    /// The first line that [`Property::parse_line`] or
    /// [`Property::deserialize`] rejects.
    pub fn parse(package: u8, text: &str, packages: &PackageTable) -> Result<Self> {
        let mut map = Self::new(package);
        for line in text.lines() {
            if let Some(prop) = Property::parse_line(line)? {
                let value = prop.deserialize(packages)?;
                map.insert(prop.name, value);
            }
        }
        Ok(map)
    }

    /// Read and parse a property resource.
    ///
    /// # Errors
    ///
    /// [`CoreError::Resource`] if the resource cannot be read, or any parse
    /// error.
    pub fn load(
        package: u8,
        source: &dyn ResourceSource,
        path: &str,
        packages: &PackageTable,
    ) -> Result<Self> {
        let text = source.read_text(path)?;
        let map = Self::parse(package, &text, packages)?;
        debug!(path, properties = map.len(), "loaded data map");
        Ok(map)
    }

    /// The package that owns the map.
    #[must_use]
    pub fn package(&self) -> u8 {
        self.package
    }

    /// Insert or replace a property. Ignored once the map is locked.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        if self.locked {
            return;
        }
        self.props.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Freeze the map.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Verify that every key in `required` is present.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] naming every absent key, in the order
    /// given.
    pub fn check_for_set(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|key| !self.has(key))
            .map(|key| key.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingProperty(missing))
        }
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| CoreError::MissingProperty(vec![name.to_string()]))
    }

    /// The `bool` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(wrong_type(name, "bool")),
        }
    }

    /// The `byte` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn byte(&self, name: &str) -> Result<u8> {
        match self.require(name)? {
            Value::Byte(v) => Ok(*v),
            _ => Err(wrong_type(name, "byte")),
        }
    }

    /// The `double` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn double(&self, name: &str) -> Result<f64> {
        match self.require(name)? {
            Value::Double(v) => Ok(*v),
            _ => Err(wrong_type(name, "double")),
        }
    }

    /// The `float` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn float(&self, name: &str) -> Result<f32> {
        match self.require(name)? {
            Value::Float(v) => Ok(*v),
            _ => Err(wrong_type(name, "float")),
        }
    }

    /// The `int` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn int(&self, name: &str) -> Result<i32> {
        match self.require(name)? {
            Value::Int(v) => Ok(*v),
            _ => Err(wrong_type(name, "int")),
        }
    }

    /// The `str` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn str(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            Value::Str(v) => Ok(v),
            _ => Err(wrong_type(name, "str")),
        }
    }

    /// The resource path held by the `file` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn file(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            Value::File(v) => Ok(v),
            _ => Err(wrong_type(name, "file")),
        }
    }

    /// The `point` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn point(&self, name: &str) -> Result<Vec2> {
        match self.require(name)? {
            Value::Point(v) => Ok(*v),
            _ => Err(wrong_type(name, "point")),
        }
    }

    /// The size-only rectangle held by the `rect` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn rect(&self, name: &str) -> Result<BoundingBox> {
        match self.require(name)? {
            Value::Rect(v) => Ok(*v),
            _ => Err(wrong_type(name, "rect")),
        }
    }

    /// The `vec` property `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn vec(&self, name: &str) -> Result<Vec2> {
        match self.require(name)? {
            Value::Vec(v) => Ok(*v),
            _ => Err(wrong_type(name, "vec")),
        }
    }

    /// The sprite reference held by `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn sprite(&self, name: &str) -> Result<&SpriteReference> {
        match self.require(name)? {
            Value::Sprite(v) => Ok(v),
            _ => Err(wrong_type(name, "sprite")),
        }
    }

    /// The texture reference held by `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn texture(&self, name: &str) -> Result<&TextureReference> {
        match self.require(name)? {
            Value::Texture(v) => Ok(v),
            _ => Err(wrong_type(name, "texture")),
        }
    }

    /// The sheet resource path held by `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn sheet(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            Value::Sheet(v) => Ok(v),
            _ => Err(wrong_type(name, "sheet")),
        }
    }

    /// The loaded image stored under `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::MissingProperty`] if absent, [`CoreError::PropertyType`]
    /// if it holds another type.
    pub fn image(&self, name: &str) -> Result<Bitmap> {
        match self.require(name)? {
            Value::Image(v) => Ok(*v),
            _ => Err(wrong_type(name, "image")),
        }
    }

    /// Write every property with a text form, one line each, sorted by
    /// name.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut names: Vec<&String> = self.props.keys().collect();
        names.sort();
        let mut out = String::new();
        for name in names {
            let value = &self.props[name];
            if let Some(text) = value.to_text() {
                let _ = writeln!(out, "{} {} {}", value.tag(), name, text);
            }
        }
        out
    }
}

fn wrong_type(name: &str, expected: &'static str) -> CoreError {
    CoreError::PropertyType {
        name: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<DataMap> {
        DataMap::parse(0, text, &PackageTable::new())
    }

    #[test]
    fn test_parse_scalar_types() {
        let map = parse(
            "bool timed true\n\
             byte length 4\n\
             double ratio 0.25\n\
             float gravity 1.5\n\
             int behavior -3\n\
             str key idle\n\
             file path asset/sprite/test/idle\n",
        )
        .unwrap();
        assert!(map.bool("timed").unwrap());
        assert_eq!(map.byte("length").unwrap(), 4);
        assert_eq!(map.double("ratio").unwrap(), 0.25);
        assert_eq!(map.float("gravity").unwrap(), 1.5);
        assert_eq!(map.int("behavior").unwrap(), -3);
        assert_eq!(map.str("key").unwrap(), "idle");
        assert_eq!(map.file("path").unwrap(), "asset/sprite/test/idle");
    }

    #[test]
    fn test_parse_pairs_and_rect() {
        let map = parse("point spawn 1,2\nvec push 0.5,-1\nrect bounds 32,48\n").unwrap();
        assert_eq!(map.point("spawn").unwrap(), Vec2::new(1.0, 2.0));
        assert_eq!(map.vec("push").unwrap(), Vec2::new(0.5, -1.0));
        assert_eq!(map.rect("bounds").unwrap(), BoundingBox::from_size(32.0, 48.0));
    }

    #[test]
    fn test_parse_references_by_number_and_name() {
        let mut packages = PackageTable::new();
        packages.create("extra").unwrap();
        let map = DataMap::parse(
            0,
            "sprite a core:idle\nsprite b 1:walk\ntexture c extra:grass\n",
            &packages,
        )
        .unwrap();
        assert_eq!(map.sprite("a").unwrap(), &SpriteReference::new(0, "idle"));
        assert_eq!(map.sprite("b").unwrap(), &SpriteReference::new(1, "walk"));
        assert_eq!(map.texture("c").unwrap(), &TextureReference::new(1, "grass"));
    }

    #[test]
    fn test_reference_to_unknown_package_fails() {
        assert!(matches!(
            parse("sprite a nowhere:idle"),
            Err(CoreError::UnregisteredPackageName(_))
        ));
        assert!(matches!(
            parse("texture a 7:grass"),
            Err(CoreError::UnregisteredPackage(7))
        ));
    }

    #[test]
    fn test_str_value_keeps_spaces() {
        let map = parse("str title A Long Name").unwrap();
        assert_eq!(map.str("title").unwrap(), "A Long Name");
    }

    #[test]
    fn test_unknown_tag_is_dropped() {
        let map = parse("colour tint red\nbyte length 2\n\n").unwrap();
        assert_eq!(map.len(), 1);
        assert!(!map.has("tint"));
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(parse("bool timed yes"), Err(CoreError::MalformedProperty { .. })));
        assert!(matches!(parse("byte length 300"), Err(CoreError::MalformedProperty { .. })));
        assert!(matches!(parse("vec push 1"), Err(CoreError::MalformedProperty { .. })));
        assert!(matches!(parse("sprite a idle"), Err(CoreError::MalformedProperty { .. })));
        assert!(matches!(parse("float gravity"), Err(CoreError::MalformedProperty { .. })));
    }

    #[test]
    fn test_behavior_identity() {
        let map = parse("behavior brain 0x10002\nbehavior other 5").unwrap();
        assert_eq!(map.get("brain"), Some(&Value::Behavior(IdentityNumber::new(1, 2))));
        assert_eq!(map.get("other"), Some(&Value::Behavior(IdentityNumber::new(0, 5))));
    }

    #[test]
    fn test_check_for_set_reports_every_missing_key() {
        let map = parse("str key idle").unwrap();
        match map.check_for_set(&["key", "length", "path"]) {
            Err(CoreError::MissingProperty(missing)) => {
                assert_eq!(missing, vec!["length".to_string(), "path".to_string()]);
            }
            other => panic!("expected MissingProperty, got {other:?}"),
        }
        assert!(map.check_for_set(&["key"]).is_ok());
    }

    #[test]
    fn test_locked_map_ignores_inserts() {
        let mut map = parse("byte length 2").unwrap();
        map.lock();
        map.insert("length", Value::Byte(9));
        map.insert("extra", Value::Bool(true));
        assert!(map.is_locked());
        assert_eq!(map.byte("length").unwrap(), 2);
        assert!(!map.has("extra"));
    }

    #[test]
    fn test_typed_getter_errors() {
        let map = parse("byte length 2").unwrap();
        assert!(matches!(
            map.float("length"),
            Err(CoreError::PropertyType { expected: "float", .. })
        ));
        assert!(matches!(map.float("gravity"), Err(CoreError::MissingProperty(_))));
    }

    #[test]
    fn test_to_text_reparses_to_same_values() {
        let text = "bool directional false\nbyte length 3\nrect bounds 32,48\nsprite state0 0:idle\n";
        let map = parse(text).unwrap();
        let mut with_image = map.clone();
        with_image.insert("frame0", Value::Image(Bitmap(1)));

        let written = with_image.to_text();
        assert!(!written.contains("frame0"));
        let reparsed = parse(&written).unwrap();
        assert_eq!(reparsed.len(), map.len());
        for name in ["directional", "length", "bounds", "state0"] {
            assert_eq!(reparsed.get(name), map.get(name));
        }
    }
}

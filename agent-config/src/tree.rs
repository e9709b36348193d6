//! Recursive configuration tree: mappings, sequences, and scalar leaves.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml::{Number, Value};
use thiserror::Error;

/// A node of a loaded configuration document.
///
/// Trees are finite and acyclic: every child is owned by exactly one parent.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigTree {
    /// Ordered collection of uniquely named children.
    Mapping(Mapping),
    /// Ordered list of children.
    Sequence(Vec<ConfigTree>),
    /// Leaf value.
    Scalar(Scalar),
}

/// Leaf value of a [`ConfigTree`].
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Explicit null (`~` or an empty value in YAML).
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer or floating point literal.
    Number(Number),
    /// String literal.
    String(String),
}

/// Insertion-ordered map from names to subtrees with unique keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, ConfigTree)>,
}

/// A mapping key that has no string form.
#[derive(Debug, Error)]
#[error("unsupported mapping key `{0}`: only scalar keys are allowed")]
pub struct UnsupportedKey(String);

impl ConfigTree {
    /// Returns an empty mapping node.
    #[must_use]
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Returns an empty sequence node.
    #[must_use]
    pub const fn sequence() -> Self {
        Self::Sequence(Vec::new())
    }

    /// Returns a null scalar node.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Returns `true` for mapping and sequence nodes.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Mapping(_) | Self::Sequence(_))
    }

    /// Returns `true` for a null scalar.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// Returns the mapping if this node is one.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the mapping mutably if this node is one.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the sequence items if this node is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[ConfigTree]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the scalar if this node is a leaf.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Returns the string payload of a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Looks up a direct child of a mapping node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigTree> {
        self.as_mapping().and_then(|mapping| mapping.get(key))
    }

    /// Short name of the node kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Sequence(_) => "sequence",
            Self::Scalar(_) => "scalar",
        }
    }
}

impl Mapping {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigTree> {
        self.entries
            .iter()
            .find_map(|(name, value)| (name.as_str() == key).then_some(value))
    }

    /// Returns the value stored under `key` mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigTree> {
        self.entries
            .iter_mut()
            .find_map(|(name, value)| (name.as_str() == key).then_some(value))
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `value` under `key`, returning the previous value.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigTree) -> Option<ConfigTree> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ConfigTree> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigTree)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates entries mutably in insertion order. Keys stay immutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ConfigTree)> {
        self.entries
            .iter_mut()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, ConfigTree)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, ConfigTree)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<Mapping> for ConfigTree {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Vec<ConfigTree>> for ConfigTree {
    fn from(items: Vec<ConfigTree>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Scalar> for ConfigTree {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<&str> for ConfigTree {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_owned()))
    }
}

impl From<String> for ConfigTree {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<bool> for ConfigTree {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for ConfigTree {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Number(Number::from(value)))
    }
}

impl From<f64> for ConfigTree {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Number(Number::from(value)))
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = UnsupportedKey;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Self::null(),
            Value::Bool(value) => Self::Scalar(Scalar::Bool(value)),
            Value::Number(value) => Self::Scalar(Scalar::Number(value)),
            Value::String(value) => Self::Scalar(Scalar::String(value)),
            Value::Sequence(items) => Self::Sequence(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(entries) => {
                let mut mapping = Mapping::new();
                for (key, value) in entries {
                    mapping.insert(key_to_string(key)?, Self::try_from(value)?);
                }
                Self::Mapping(mapping)
            }
            Value::Tagged(tagged) => Self::try_from(tagged.value)?,
        })
    }
}

fn key_to_string(key: Value) -> Result<String, UnsupportedKey> {
    match key {
        Value::Null => Ok("null".to_owned()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Number(value) => Ok(value.to_string()),
        Value::String(value) => Ok(value),
        Value::Tagged(tagged) => key_to_string(tagged.value),
        other @ (Value::Sequence(_) | Value::Mapping(_)) => Err(UnsupportedKey(
            serde_yaml::to_string(&other)
                .map_or_else(|_| "<complex key>".to_owned(), |s| s.trim().to_owned()),
        )),
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mapping(mapping) => mapping.serialize(serializer),
            Self::Sequence(items) => items.serialize(serializer),
            Self::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(value) => value.serialize(serializer),
            Self::String(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(de::Error::custom)
    }
}

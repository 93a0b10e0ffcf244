//! Loosely typed configuration input.
//!
//! Configuration arrives from sources that do not carry Rust types (process
//! environment, JSON settings files, hand-built maps in tests). [`RawValue`]
//! captures every shape such a source can produce so that the validator can
//! report a type mismatch instead of failing to deserialize.

use crate::field::Field;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Kind of a sequence value.
///
/// The distinction matters for fields that accept only an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    List,
    Tuple,
    Set,
    FrozenSet,
    /// A lazily produced sequence (e.g. collected from an iterator).
    Iter,
}

/// Structural shape of a [`RawValue`], as checked against the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Duration,
    Seq(SeqKind),
    Map,
}

/// A configuration value before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    /// Wide enough to hold every `i64` and `u64`, so that out-of-range
    /// integers reach the validator instead of being coerced.
    Int(i128),
    Float(f64),
    Str(String),
    Duration(chrono::Duration),
    /// A `std` duration kept as given; it may exceed chrono's range.
    StdDuration(std::time::Duration),
    Seq(SeqKind, Vec<RawValue>),
    Map(BTreeMap<String, RawValue>),
}

impl RawValue {
    /// Build a list value.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        Self::seq(SeqKind::List, items)
    }

    /// Build a tuple value.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        Self::seq(SeqKind::Tuple, items)
    }

    /// Build a set value. Duplicates are kept; set semantics apply when the
    /// value is normalized.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        Self::seq(SeqKind::Set, items)
    }

    /// Build a sequence value of the given kind.
    pub fn seq<I, T>(kind: SeqKind, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        RawValue::Seq(kind, items.into_iter().map(Into::into).collect())
    }

    /// Structural shape of this value.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            RawValue::Null => Shape::Null,
            RawValue::Bool(_) => Shape::Bool,
            RawValue::Int(_) => Shape::Int,
            RawValue::Float(_) => Shape::Float,
            RawValue::Str(_) => Shape::Str,
            RawValue::Duration(_) | RawValue::StdDuration(_) => Shape::Duration,
            RawValue::Seq(kind, _) => Shape::Seq(*kind),
            RawValue::Map(_) => Shape::Map,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(i128::from(value))
    }
}

impl From<u64> for RawValue {
    fn from(value: u64) -> Self {
        RawValue::Int(i128::from(value))
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(i128::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Int(i128::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Str(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Str(value)
    }
}

impl From<chrono::Duration> for RawValue {
    fn from(value: chrono::Duration) -> Self {
        RawValue::Duration(value)
    }
}

impl From<std::time::Duration> for RawValue {
    fn from(value: std::time::Duration) -> Self {
        RawValue::StdDuration(value)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(value: Vec<T>) -> Self {
        RawValue::list(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

/// JSON arrays become lists, objects become maps, and numbers become
/// integers when they fit in an `i64` or `u64`.
impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    RawValue::Int(i128::from(u))
                } else {
                    RawValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => RawValue::Str(s),
            serde_json::Value::Array(items) => RawValue::list(items),
            serde_json::Value::Object(map) => {
                RawValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Raw option map handed to the validator.
///
/// Keys are resolved through [`Field::from_key`]; unrecognized keys are
/// dropped on insertion. Deserializes from any JSON object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "serde_json::Map<String, serde_json::Value>")]
pub struct RawConfig {
    values: HashMap<Field, RawValue>,
}

impl RawConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value under `key`.
    ///
    /// Returns the field the key resolved to, or `None` when the key is not
    /// a recognized option (the value is then discarded).
    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) -> Option<Field> {
        let Some(field) = Field::from_key(key) else {
            tracing::trace!(
                target: "authjwt.loader",
                key = %key,
                "Ignoring unrecognized configuration key"
            );
            return None;
        };
        self.values.insert(field, value.into());
        Some(field)
    }

    /// Value supplied for `field`. A [`RawValue::Null`] counts as absent.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.values.get(&field).filter(|value| !value.is_null())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawConfig {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut raw = RawConfig::new();
        for (key, value) in map {
            raw.insert(&key, RawValue::from(value));
        }
        raw
    }
}

impl<K: AsRef<str>, V: Into<RawValue>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = RawConfig::new();
        for (key, value) in iter {
            raw.insert(key.as_ref(), value);
        }
        raw
    }
}

//! Tag bag model
//!
//! A [`TagBag`] is the decoder's output: an arbitrarily nested mapping from
//! string keys to [`TagValue`]s. Every traversal step matches on the variant
//! instead of probing properties.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub type TagMap = BTreeMap<String, TagValue>;

/// Keys that mark a JSON object as a `{value, description}` entry rather
/// than a nested namespace.
const DESCRIBED_KEYS: &[&str] = &["id", "value", "description", "attributes"];

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Scalar(Scalar),
    /// A decoded tag: human-readable description plus the raw typed value.
    Described {
        description: Option<String>,
        value: Option<Box<TagValue>>,
    },
    Array(Vec<TagValue>),
    Nested(TagMap),
}

impl TagValue {
    pub fn text(s: impl Into<String>) -> Self {
        TagValue::Scalar(Scalar::Text(s.into()))
    }

    pub fn number(n: f64) -> Self {
        TagValue::Scalar(Scalar::Number(n))
    }

    pub fn described(description: impl Into<String>, value: TagValue) -> Self {
        TagValue::Described {
            description: Some(description.into()),
            value: Some(Box::new(value)),
        }
    }

    pub fn as_map(&self) -> Option<&TagMap> {
        match self {
            TagValue::Nested(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a JSON tag dump node. `null` yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(TagValue::Scalar(Scalar::Bool(*b))),
            Value::Number(n) => n.as_f64().map(TagValue::number),
            Value::String(s) => Some(TagValue::text(s.clone())),
            Value::Array(items) => Some(TagValue::Array(
                items.iter().filter_map(TagValue::from_json).collect(),
            )),
            Value::Object(obj) => {
                let is_described = (obj.contains_key("value") || obj.contains_key("description"))
                    && obj.keys().all(|k| DESCRIBED_KEYS.contains(&k.as_str()));
                if is_described {
                    Some(TagValue::Described {
                        description: obj
                            .get("description")
                            .and_then(|d| d.as_str())
                            .map(str::to_string),
                        value: obj.get("value").and_then(TagValue::from_json).map(Box::new),
                    })
                } else {
                    Some(TagValue::Nested(
                        obj.iter()
                            .filter_map(|(k, v)| TagValue::from_json(v).map(|v| (k.clone(), v)))
                            .collect(),
                    ))
                }
            }
        }
    }
}

/// The decoded tags of one file. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagBag {
    root: TagMap,
}

impl TagBag {
    pub fn new(root: TagMap) -> Self {
        Self { root }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &TagMap {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.root.get(key)
    }

    /// Walk a path of keys segment by segment; every segment but the last
    /// must be a nested map.
    pub fn walk(&self, path: &[&str]) -> Option<&TagValue> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(*first)?;
        for segment in rest {
            node = node.as_map()?.get(*segment)?;
        }
        Some(node)
    }

    /// Map at `path`; the empty path is the root.
    pub fn map_at(&self, path: &[&str]) -> Option<&TagMap> {
        if path.is_empty() {
            return Some(&self.root);
        }
        self.walk(path)?.as_map()
    }

    /// Build a bag from a JSON dump. Only objects are accepted at the top
    /// level; a single-element array wrapper (exiftool `-j`) is unwrapped.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() == 1 => Self::from_json(&items[0]),
            Value::Object(_) => match TagValue::from_json(value)? {
                TagValue::Nested(root) => Some(Self { root }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A located raw value, with no provenance beyond having been found.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Array(Vec<RawValue>),
}

impl RawValue {
    /// Located-value semantics: prefer the description, else the raw value,
    /// else a bare scalar or array. Nested maps are not values.
    pub fn locate(tag: &TagValue) -> Option<Self> {
        match tag {
            TagValue::Scalar(Scalar::Text(s)) => Some(RawValue::Text(s.clone())),
            TagValue::Scalar(Scalar::Number(n)) => Some(RawValue::Number(*n)),
            TagValue::Scalar(Scalar::Bool(b)) => Some(RawValue::Text(b.to_string())),
            TagValue::Described { description, value } => match description {
                Some(d) if !d.trim().is_empty() => Some(RawValue::Text(d.clone())),
                // A blank pair is a miss so later locations still get a turn
                _ => value.as_deref().and_then(RawValue::locate).filter(|v| !v.is_blank()),
            },
            TagValue::Array(items) => Some(RawValue::Array(
                items.iter().filter_map(RawValue::locate).collect(),
            )),
            TagValue::Nested(_) => None,
        }
    }

    /// Like [`RawValue::locate`] but prefers the typed value over the
    /// description. Used where a numeric shape matters more than prose.
    pub fn locate_typed(tag: &TagValue) -> Option<Self> {
        match tag {
            TagValue::Described { value: Some(v), .. } => {
                RawValue::locate_typed(v).or_else(|| RawValue::locate(tag))
            }
            TagValue::Array(items) => Some(RawValue::Array(
                items.iter().filter_map(RawValue::locate_typed).collect(),
            )),
            _ => RawValue::locate(tag),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Stringification: numbers in shortest form, arrays comma-joined.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

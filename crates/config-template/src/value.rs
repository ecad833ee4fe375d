//! Core value types for configuration trees.
//!
//! A [`ConfigValue`] is the normalized, format-independent shape of every
//! document this crate reads: INI sections, JSON objects and YAML mappings all
//! become [`ConfigValue::Section`]s, and repeated INI keys become
//! [`ConfigValue::MultiSet`]s.

use std::fmt;

use crate::multimap::OrderedMultiMap;

/// An atomic value.
///
/// Reals keep their source text so that documents round-trip without float
/// formatting drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Real(String),
    String(String),
}

impl Scalar {
    /// Whether the value counts as "empty" for override coercion.
    pub fn is_falsy(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Bool(b) => !b,
            Scalar::Integer(i) => *i == 0,
            Scalar::Real(text) => text.parse::<f64>().is_ok_and(|f| f == 0.0),
            Scalar::String(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Real(text) | Scalar::String(text) => f.write_str(text),
        }
    }
}

/// An insertion-ordered set of string values.
///
/// Membership is decided on the string form, so `1` and `"1"` are the same
/// member. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct MultiSet {
    members: Vec<String>,
}

impl MultiSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns false if it was already present.
    pub fn insert(&mut self, member: impl Into<String>) -> bool {
        let member = member.into();
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Add the string form of `value`, or every member if `value` is itself a set.
    pub fn absorb(&mut self, value: ConfigValue) {
        match value {
            ConfigValue::MultiSet(other) => self.extend(other.members),
            other => {
                self.insert(other.to_string());
            }
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Members sorted by their string form.
    pub fn sorted(&self) -> Vec<&str> {
        let mut members: Vec<&str> = self.iter().collect();
        members.sort_unstable();
        members
    }
}

impl PartialEq for MultiSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|m| other.contains(m))
    }
}

impl Eq for MultiSet {}

impl<S: Into<String>> Extend<S> for MultiSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for member in iter {
            self.insert(member);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for MultiSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = MultiSet::new();
        set.extend(iter);
        set
    }
}

/// A node of a configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Scalar(Scalar),
    List(Vec<ConfigValue>),
    MultiSet(MultiSet),
    Section(OrderedMultiMap),
}

impl ConfigValue {
    pub fn null() -> Self {
        ConfigValue::Scalar(Scalar::Null)
    }

    pub fn string(s: impl Into<String>) -> Self {
        ConfigValue::Scalar(Scalar::String(s.into()))
    }

    pub fn integer(i: i64) -> Self {
        ConfigValue::Scalar(Scalar::Integer(i))
    }

    pub fn bool(b: bool) -> Self {
        ConfigValue::Scalar(Scalar::Bool(b))
    }

    pub fn empty_section() -> Self {
        ConfigValue::Section(OrderedMultiMap::new())
    }

    pub fn is_section(&self) -> bool {
        matches!(self, ConfigValue::Section(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ConfigValue::List(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_multiset(&self) -> Option<&MultiSet> {
        match self {
            ConfigValue::MultiSet(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&OrderedMultiMap> {
        match self {
            ConfigValue::Section(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut OrderedMultiMap> {
        match self {
            ConfigValue::Section(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child of a section.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_section()?.get(key)
    }

    /// Whether the value counts as "empty" for override coercion.
    pub fn is_falsy(&self) -> bool {
        match self {
            ConfigValue::Scalar(s) => s.is_falsy(),
            ConfigValue::List(items) => items.is_empty(),
            ConfigValue::MultiSet(set) => set.is_empty(),
            ConfigValue::Section(map) => map.is_empty(),
        }
    }

    /// Convert to a JSON value. Section keys come out sorted.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            ConfigValue::Scalar(Scalar::Null) => Value::Null,
            ConfigValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            ConfigValue::Scalar(Scalar::Integer(i)) => Value::from(*i),
            ConfigValue::Scalar(Scalar::Real(text)) => text
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(text.clone())),
            ConfigValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            ConfigValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ConfigValue::MultiSet(set) => {
                Value::Array(set.iter().map(|m| Value::String(m.to_string())).collect())
            }
            ConfigValue::Section(map) => {
                let mut pairs: Vec<(&str, &ConfigValue)> = map.iter().collect();
                pairs.sort_by(|a, b| a.0.cmp(b.0));
                let object = pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect();
                Value::Object(object)
            }
        }
    }
}

impl fmt::Display for ConfigValue {
    /// The string form: scalars verbatim, lists and sets comma-joined,
    /// sections as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Scalar(s) => write!(f, "{s}"),
            ConfigValue::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
            ConfigValue::MultiSet(set) => f.write_str(&set.iter().collect::<Vec<_>>().join(",")),
            ConfigValue::Section(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<Scalar> for ConfigValue {
    fn from(s: Scalar) -> Self {
        ConfigValue::Scalar(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::string(s)
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::string(s)
    }
}

impl From<MultiSet> for ConfigValue {
    fn from(set: MultiSet) -> Self {
        ConfigValue::MultiSet(set)
    }
}

impl From<OrderedMultiMap> for ConfigValue {
    fn from(map: OrderedMultiMap) -> Self {
        ConfigValue::Section(map)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ConfigValue::null(),
            Value::Bool(b) => ConfigValue::bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::integer(i),
                None => ConfigValue::Scalar(Scalar::Real(n.to_string())),
            },
            Value::String(s) => ConfigValue::string(s),
            Value::Array(items) => ConfigValue::List(items.into_iter().map(Self::from).collect()),
            Value::Object(object) => ConfigValue::Section(
                object
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

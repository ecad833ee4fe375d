//! Insertion-ordered map that coalesces repeated keys.
//!
//! Configuration formats with repeated keys (`key = a` followed by `key = b`)
//! are represented losslessly: the second `set` turns the value into a
//! [`MultiSet`] instead of overwriting it.
//!
//! Besides key/value pairs, a map may hold valueless directives and verbatim
//! lines (comments, blank lines) in their original positions. Those never
//! show up through the key/value accessors ([`OrderedMultiMap::get`],
//! [`OrderedMultiMap::iter`]); only writers that walk
//! [`OrderedMultiMap::entries`] see them.

use crate::error::{ConfigTemplateError, Result};
use crate::value::{ConfigValue, MultiSet, Scalar};

/// One positional entry of an [`OrderedMultiMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A key with a value.
    KeyValue { key: String, value: ConfigValue },

    /// A key written without separator or value (`skip-name-resolve`).
    Valueless(String),

    /// A line kept only for round-trip fidelity (comment or blank line).
    Verbatim(String),
}

impl Entry {
    /// The text a prefix lookup matches against.
    fn stored_key(&self) -> &str {
        match self {
            Entry::KeyValue { key, .. } | Entry::Valueless(key) => key,
            Entry::Verbatim(line) => line.trim_start(),
        }
    }

    fn is_key(&self, wanted: &str) -> bool {
        match self {
            Entry::KeyValue { key, .. } | Entry::Valueless(key) => key == wanted,
            Entry::Verbatim(_) => false,
        }
    }
}

/// An insertion-ordered key → [`ConfigValue`] container.
#[derive(Debug, Clone, Default)]
pub struct OrderedMultiMap {
    entries: Vec<Entry>,
}

impl OrderedMultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| match entry {
            Entry::KeyValue { key: k, .. } => k == key,
            _ => false,
        })
    }

    /// Set `key`, coalescing with an existing value.
    ///
    /// - absent key: appended
    /// - existing scalar or list whose string form differs: promoted to a
    ///   [`MultiSet`] of both string forms
    /// - existing set: the new string form is added if not already a member
    /// - existing section: left untouched
    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        let Some(index) = self.position(&key) else {
            self.entries.push(Entry::KeyValue { key, value });
            return;
        };

        if let Entry::KeyValue { value: current, .. } = &mut self.entries[index] {
            coalesce(current, value);
        }
    }

    /// Insert `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push(Entry::KeyValue { key, value });
                None
            }
        }
    }

    /// Remove every entry stored under `key`, valueless directives included.
    ///
    /// Returns the last removed value, if any.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        let mut removed = None;
        let mut kept = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if !entry.is_key(key) {
                kept.push(entry);
                continue;
            }
            if let Entry::KeyValue { value, .. } = entry {
                removed = Some(value);
            }
        }
        self.entries = kept;
        removed
    }

    /// Append a valueless directive.
    pub fn push_valueless(&mut self, key: impl Into<String>) {
        self.entries.push(Entry::Valueless(key.into()));
    }

    /// Append a verbatim line.
    pub fn push_verbatim(&mut self, line: impl Into<String>) {
        self.entries.push(Entry::Verbatim(line.into()));
    }

    /// Extend the string value of the last entry with a continuation line.
    ///
    /// Returns false (and changes nothing) unless the last entry is a
    /// key with a string value.
    pub fn append_continuation(&mut self, line: &str) -> bool {
        match self.entries.last_mut() {
            Some(Entry::KeyValue {
                value: ConfigValue::Scalar(Scalar::String(text)),
                ..
            }) => {
                text.push('\n');
                text.push_str(line);
                true
            }
            _ => false,
        }
    }

    /// Position of the unique entry whose stored key starts with `prefix`.
    ///
    /// Verbatim lines are matched on their text, so `#option` finds a
    /// commented-out `#option = value` template line.
    ///
    /// # Errors
    ///
    /// [`ConfigTemplateError::AmbiguousKey`] if more than one entry matches.
    pub fn index_by_prefix(&self, prefix: &str) -> Result<Option<usize>> {
        let matches: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.stored_key().starts_with(prefix))
            .map(|(index, _)| index)
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [index] => Ok(Some(*index)),
            _ => Err(ConfigTemplateError::AmbiguousKey {
                prefix: prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// Insert `key` immediately after the entry at `index`.
    ///
    /// All other entries keep their relative order. If `key` already holds a
    /// value it is coalesced in place, as with [`OrderedMultiMap::set`].
    ///
    /// # Errors
    ///
    /// [`ConfigTemplateError::IndexOutOfRange`] if `index` is not a valid position.
    pub fn insert_at(&mut self, index: usize, key: impl Into<String>, value: ConfigValue) -> Result<()> {
        if index >= self.entries.len() {
            return Err(ConfigTemplateError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        let key = key.into();
        if self.position(&key).is_some() {
            self.set(key, value);
        } else {
            self.entries.insert(index + 1, Entry::KeyValue { key, value });
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::KeyValue { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.iter_mut().find_map(|entry| match entry {
            Entry::KeyValue { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    /// Whether `key` holds a value or a valueless directive.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.is_key(key))
    }

    /// Key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::KeyValue { key, value } => Some((key.as_str(), value)),
            _ => None,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Every positional entry, verbatim lines included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when there are no key/value pairs (verbatim lines don't count).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn coalesce(current: &mut ConfigValue, incoming: ConfigValue) {
    match current {
        ConfigValue::Section(_) => {}
        ConfigValue::MultiSet(set) => set.absorb(incoming),
        ConfigValue::Scalar(_) | ConfigValue::List(_) => {
            let mut set = MultiSet::new();
            set.insert(current.to_string());
            set.absorb(incoming);
            if set.len() > 1 {
                *current = ConfigValue::MultiSet(set);
            }
        }
    }
}

impl PartialEq for OrderedMultiMap {
    /// Same key/value pairs, in any order. Verbatim lines are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, ConfigValue)> for OrderedMultiMap {
    fn from_iter<I: IntoIterator<Item = (K, ConfigValue)>>(iter: I) -> Self {
        let mut map = OrderedMultiMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

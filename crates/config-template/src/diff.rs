//! Structural diff between two normalized trees.

use crate::error::Result;
use crate::multimap::OrderedMultiMap;
use crate::tree::encode_json;
use crate::value::ConfigValue;

/// Added/removed/changed buckets between an old and a new tree.
///
/// For mapping documents every bucket is a section: `added` and `removed`
/// hold the one-sided keys with their values, `changed` holds
/// `{"current": old, "new": new}` for leaf changes, and nested sections
/// contribute their own buckets under their key. For sequence documents the
/// buckets are lists of members, with `changed` holding every member present
/// on one side only.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    pub added: ConfigValue,
    pub removed: ConfigValue,
    pub changed: ConfigValue,
}

impl DiffReport {
    fn empty_mapping() -> Self {
        Self {
            added: ConfigValue::empty_section(),
            removed: ConfigValue::empty_section(),
            changed: ConfigValue::empty_section(),
        }
    }

    /// True if any bucket is non-empty.
    pub fn has_changes(&self) -> bool {
        !(self.added.is_falsy() && self.removed.is_falsy() && self.changed.is_falsy())
    }

    /// The report as one tree: `{"added": …, "changed": …, "removed": …}`.
    pub fn to_tree(&self) -> ConfigValue {
        ConfigValue::Section(
            [
                ("added", self.added.clone()),
                ("changed", self.changed.clone()),
                ("removed", self.removed.clone()),
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Render as key-sorted JSON indented by four spaces.
    ///
    /// # Errors
    ///
    /// Only if JSON serialization itself fails.
    pub fn to_prepared_json(&self) -> Result<String> {
        encode_json(&self.to_tree())
    }
}

/// Diff `old` against `new`.
///
/// Two mappings are compared key by key, recursing into sections present on
/// both sides. Two sequences are compared as sets of members. When the shapes
/// differ, `old` is treated as an empty tree of `new`'s shape. Scalar roots
/// are reported as a single leaf change.
///
/// Returns the report and whether anything changed.
pub fn diff(old: &ConfigValue, new: &ConfigValue) -> (DiffReport, bool) {
    let report = match (old, new) {
        (ConfigValue::Section(old), ConfigValue::Section(new)) => diff_mappings(old, new),
        (ConfigValue::List(old), ConfigValue::List(new)) => diff_sequences(old, new),
        (_, ConfigValue::Section(new)) => diff_mappings(&OrderedMultiMap::new(), new),
        (_, ConfigValue::List(new)) => diff_sequences(&[], new),
        _ => {
            let mut report = DiffReport::empty_mapping();
            if old != new {
                report.changed = leaf_change(old, new);
            }
            report
        }
    };
    let has_changes = report.has_changes();
    tracing::debug!(has_changes, "Computed structural diff");
    (report, has_changes)
}

fn diff_mappings(old: &OrderedMultiMap, new: &OrderedMultiMap) -> DiffReport {
    let mut added = OrderedMultiMap::new();
    let mut removed = OrderedMultiMap::new();
    let mut changed = OrderedMultiMap::new();

    for (key, value) in new.iter() {
        if old.get(key).is_none() {
            added.insert(key, value.clone());
        }
    }

    for (key, old_value) in old.iter() {
        let Some(new_value) = new.get(key) else {
            removed.insert(key, old_value.clone());
            continue;
        };

        match (old_value, new_value) {
            (ConfigValue::Section(old_child), ConfigValue::Section(new_child)) => {
                let child = diff_mappings(old_child, new_child);
                nest(&mut added, key, child.added);
                nest(&mut removed, key, child.removed);
                nest(&mut changed, key, child.changed);
            }
            _ if old_value != new_value => {
                changed.insert(key, leaf_change(old_value, new_value));
            }
            _ => {}
        }
    }

    DiffReport {
        added: ConfigValue::Section(added),
        removed: ConfigValue::Section(removed),
        changed: ConfigValue::Section(changed),
    }
}

fn nest(bucket: &mut OrderedMultiMap, key: &str, child: ConfigValue) {
    if !child.is_falsy() {
        bucket.insert(key, child);
    }
}

fn leaf_change(old: &ConfigValue, new: &ConfigValue) -> ConfigValue {
    ConfigValue::Section(
        [("current", old.clone()), ("new", new.clone())]
            .into_iter()
            .collect(),
    )
}

fn diff_sequences(old: &[ConfigValue], new: &[ConfigValue]) -> DiffReport {
    let added: Vec<ConfigValue> = new.iter().filter(|m| !old.contains(m)).cloned().collect();
    let removed: Vec<ConfigValue> = old.iter().filter(|m| !new.contains(m)).cloned().collect();

    let mut changed: Vec<ConfigValue> = Vec::with_capacity(added.len() + removed.len());
    for member in added.iter().chain(&removed) {
        if !changed.contains(member) {
            changed.push(member.clone());
        }
    }

    DiffReport {
        added: ConfigValue::List(added),
        removed: ConfigValue::List(removed),
        changed: ConfigValue::List(changed),
    }
}

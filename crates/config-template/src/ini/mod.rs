//! Section/key-value text documents.
//!
//! An [`IniDocument`] keeps every section as an [`OrderedMultiMap`], so
//! repeated keys coalesce into multi-value sets and comments stay where they
//! were. The sentinel [`DEFAULT_SECTION`] bucket holds keys that appear before
//! any header or under an explicit `[DEFAULT]` header.
//!
//! ```text
//! # managed by config-template
//! [DEFAULT]
//! debug = false
//!
//! [database]
//! connection = mysql://db
//! connection = mysql://replica
//! ```

mod apply;
mod parser;
mod writer;

use indexmap::IndexMap;

use crate::error::{ConfigTemplateError, Result};
use crate::multimap::OrderedMultiMap;
use crate::value::ConfigValue;

pub use apply::apply_overrides;
pub use parser::parse_document;
pub use writer::write_document;

/// Name of the sentinel default section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// A parsed section/key-value document.
#[derive(Debug, Clone)]
pub struct IniDocument {
    defaults: OrderedMultiMap,
    explicit_default_header: bool,
    sections: IndexMap<String, OrderedMultiMap>,
    default_section: String,
}

impl IniDocument {
    /// Create an empty document whose default section is `default_section`.
    pub fn new(default_section: impl Into<String>) -> Self {
        Self {
            defaults: OrderedMultiMap::new(),
            explicit_default_header: false,
            sections: IndexMap::new(),
            default_section: default_section.into(),
        }
    }

    /// Parse `text`. See [`parse_document`].
    pub fn parse(text: &str, default_section: &str) -> Self {
        parse_document(text, default_section)
    }

    /// The configured default-section name.
    pub fn default_section(&self) -> &str {
        &self.default_section
    }

    fn has_custom_default(&self) -> bool {
        self.default_section != DEFAULT_SECTION
    }

    /// The sentinel bucket (`[DEFAULT]` and header-less preamble).
    pub fn defaults(&self) -> &OrderedMultiMap {
        &self.defaults
    }

    /// Named sections in discovery order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &OrderedMultiMap)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    pub fn has_section(&self, name: &str) -> bool {
        name == DEFAULT_SECTION || self.sections.contains_key(name)
    }

    /// Look up a section. Section names are case-sensitive.
    pub fn section(&self, name: &str) -> Option<&OrderedMultiMap> {
        if name == DEFAULT_SECTION {
            Some(&self.defaults)
        } else {
            self.sections.get(name)
        }
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut OrderedMultiMap> {
        if name == DEFAULT_SECTION {
            Some(&mut self.defaults)
        } else {
            self.sections.get_mut(name)
        }
    }

    /// Make sure section `name` exists. Existing sections are left alone.
    pub fn ensure_section(&mut self, name: &str) -> &mut OrderedMultiMap {
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        self.sections.entry(name.to_string()).or_default()
    }

    pub(crate) fn mark_explicit_default_header(&mut self) {
        self.explicit_default_header = true;
    }

    pub(crate) fn has_explicit_default_header(&self) -> bool {
        self.explicit_default_header
    }

    fn is_default(&self, section: &str) -> bool {
        section == DEFAULT_SECTION || section == self.default_section
    }

    /// Remove every entry for `key` in `section`.
    ///
    /// # Errors
    ///
    /// [`ConfigTemplateError::MissingSection`] if the section does not exist.
    pub fn remove_option(&mut self, section: &str, key: &str) -> Result<Option<ConfigValue>> {
        let entries = self.section_mut(section).ok_or_else(|| missing(section))?;
        Ok(entries.remove(key))
    }

    /// Set `key` in `section`, coalescing with an existing value.
    ///
    /// New keys of the default section are placed right after a commented-out
    /// template line for them (`#key = ...`) when one exists.
    ///
    /// # Errors
    ///
    /// - [`ConfigTemplateError::MissingSection`] if the section does not exist
    /// - [`ConfigTemplateError::AmbiguousKey`] if several template lines match
    pub fn set(&mut self, section: &str, key: &str, value: ConfigValue) -> Result<()> {
        let is_default = self.is_default(section);
        let entries = self.section_mut(section).ok_or_else(|| missing(section))?;

        if is_default && entries.get(key).is_none() {
            if let Some(index) = entries.index_by_prefix(&format!("#{key}"))? {
                tracing::debug!(section, key, index, "Placing option after its commented template");
                return entries.insert_at(index, key, value);
            }
        }

        entries.set(key, value);
        Ok(())
    }

    /// Add a valueless directive to `section`.
    ///
    /// # Errors
    ///
    /// [`ConfigTemplateError::MissingSection`] if the section does not exist.
    pub fn set_valueless(&mut self, section: &str, key: &str) -> Result<()> {
        let entries = self.section_mut(section).ok_or_else(|| missing(section))?;
        entries.push_valueless(key);
        Ok(())
    }

    /// Serialize. See [`write_document`].
    pub fn write(&self, ignore_empty_values: bool) -> String {
        write_document(self, ignore_empty_values)
    }

    /// Read the document back as a tree of `section → key → value`.
    ///
    /// A key of a named section whose value equals the default section's value
    /// for that key is inherited, so it is reported once under the default
    /// section rather than under every section. Comments, blank lines and
    /// valueless directives are not part of the tree.
    pub fn to_tree(&self) -> ConfigValue {
        let mut default_bucket: OrderedMultiMap = self
            .defaults
            .iter()
            .map(|(key, value)| (key, value.clone()))
            .collect();

        if self.has_custom_default() {
            if let Some(section) = self.sections.get(&self.default_section) {
                for (key, value) in section.iter() {
                    default_bucket.insert(key, value.clone());
                }
            }
        }

        let mut named = Vec::with_capacity(self.sections.len());
        for (name, section) in &self.sections {
            if self.has_custom_default() && *name == self.default_section {
                continue;
            }
            let mut bucket = OrderedMultiMap::new();
            for (key, value) in section.iter() {
                if default_bucket.get(key) == Some(value) {
                    continue;
                }
                bucket.insert(key, value.clone());
            }
            named.push((name.as_str(), ConfigValue::Section(bucket)));
        }

        let mut tree = OrderedMultiMap::new();
        if !default_bucket.is_empty() {
            tree.insert(self.default_section.clone(), ConfigValue::Section(default_bucket));
        }
        for (name, bucket) in named {
            tree.insert(name, bucket);
        }
        ConfigValue::Section(tree)
    }
}

fn missing(section: &str) -> ConfigTemplateError {
    ConfigTemplateError::MissingSection {
        section: section.to_string(),
    }
}

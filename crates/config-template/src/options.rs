//! Merge options and format selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigTemplateError;
use crate::ini::DEFAULT_SECTION;

/// The serialization shape of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// Section/key-value text.
    Ini,
    Json,
    #[serde(alias = "yml")]
    Yaml,
}

impl ConfigFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigFormat::Ini => "ini",
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigTemplateError;

    /// Case-insensitive; `yml` is accepted for YAML.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ini" => Ok(ConfigFormat::Ini),
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigTemplateError::UnknownFormat { name: s.to_string() }),
        }
    }
}

/// When plain override strings are split into lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Split any plain string containing a comma, or a newline unless
    /// multiline strings are preserved.
    #[default]
    Legacy,

    /// Split only values tagged `!split`.
    Explicit,
}

/// Flags controlling a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Append list and set overrides to existing collections instead of
    /// replacing them.
    pub extend_lists: bool,

    /// Drop valueless INI directives and blank lines on write.
    pub ignore_empty_values: bool,

    /// Name of the INI default section.
    pub default_section: String,

    /// Keep newlines inside override strings instead of splitting on them,
    /// and write multi-line YAML strings as literal blocks.
    pub preserve_multiline_strings: bool,

    pub split_mode: SplitMode,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            extend_lists: true,
            ignore_empty_values: true,
            default_section: DEFAULT_SECTION.to_string(),
            preserve_multiline_strings: false,
            split_mode: SplitMode::Legacy,
        }
    }
}

impl MergeOptions {
    pub fn with_extend_lists(mut self, extend_lists: bool) -> Self {
        self.extend_lists = extend_lists;
        self
    }

    pub fn with_ignore_empty_values(mut self, ignore_empty_values: bool) -> Self {
        self.ignore_empty_values = ignore_empty_values;
        self
    }

    pub fn with_default_section(mut self, default_section: impl Into<String>) -> Self {
        self.default_section = default_section.into();
        self
    }

    pub fn with_preserve_multiline_strings(mut self, preserve: bool) -> Self {
        self.preserve_multiline_strings = preserve;
        self
    }

    pub fn with_split_mode(mut self, split_mode: SplitMode) -> Self {
        self.split_mode = split_mode;
        self
    }
}

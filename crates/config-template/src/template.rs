//! Format dispatch and change planning.

use crate::diff::{DiffReport, diff};
use crate::error::Result;
use crate::ini::{IniDocument, apply_overrides};
use crate::merge::deep_merge;
use crate::options::{ConfigFormat, MergeOptions};
use crate::overrides::OverrideSpec;
use crate::tree::{decode_json, decode_yaml, encode_json, encode_yaml};
use crate::value::ConfigValue;

/// A merged document.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    /// The serialized document.
    pub rendered: String,

    /// The normalized tree of the merged document.
    pub tree: ConfigValue,
}

/// Merge `overrides` into `document` and serialize the result.
///
/// INI documents are edited in place, key by key, so comments and untouched
/// entries keep their positions. JSON and YAML documents are decoded, deep
/// merged and re-encoded with sorted keys.
///
/// # Errors
///
/// Fails before producing any output if the document does not decode, an
/// override cannot be applied, or the result cannot be encoded.
pub fn merge_overrides(
    format: ConfigFormat,
    document: &str,
    overrides: &OverrideSpec,
    options: &MergeOptions,
) -> Result<MergeOutput> {
    tracing::debug!(%format, empty_overrides = overrides.is_empty(), "Merging overrides");

    match format {
        ConfigFormat::Ini => {
            let mut doc = IniDocument::parse(document, &options.default_section);
            apply_overrides(&mut doc, overrides)?;
            Ok(MergeOutput {
                rendered: doc.write(options.ignore_empty_values),
                tree: doc.to_tree(),
            })
        }
        ConfigFormat::Json => {
            let tree = deep_merge(decode_json(document)?, overrides.root(), options);
            Ok(MergeOutput {
                rendered: encode_json(&tree)?,
                tree,
            })
        }
        ConfigFormat::Yaml => {
            let tree = deep_merge(decode_yaml(document)?, overrides.root(), options);
            Ok(MergeOutput {
                rendered: encode_yaml(&tree, options.preserve_multiline_strings)?,
                tree,
            })
        }
    }
}

/// The outcome of planning a write: what would be written and how it
/// differs from what is there now.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePlan {
    pub rendered: String,
    pub merged: ConfigValue,
    pub report: DiffReport,
}

impl ChangePlan {
    pub fn has_changes(&self) -> bool {
        self.report.has_changes()
    }
}

/// A format and option set, reusable across documents.
///
/// # Example
///
/// ```rust
/// use config_template::{ConfigFormat, ConfigTemplate, MergeOptions, OverrideSpec};
///
/// let template = ConfigTemplate::new(ConfigFormat::Ini, MergeOptions::default());
/// let overrides = OverrideSpec::from_yaml_str("server:\n  port: 8080\n").unwrap();
/// let output = template.merge("[server]\nport = 80\n", &overrides).unwrap();
/// assert_eq!(output.rendered, "[server]\nport = 8080\n\n");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigTemplate {
    format: ConfigFormat,
    options: MergeOptions,
}

impl ConfigTemplate {
    pub fn new(format: ConfigFormat, options: MergeOptions) -> Self {
        Self { format, options }
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// See [`merge_overrides`].
    pub fn merge(&self, document: &str, overrides: &OverrideSpec) -> Result<MergeOutput> {
        merge_overrides(self.format, document, overrides, &self.options)
    }

    /// The normalized tree of `document`, as a merge with no overrides sees it.
    pub fn normalize(&self, document: &str) -> Result<ConfigValue> {
        Ok(self.merge(document, &OverrideSpec::empty())?.tree)
    }

    /// Merge `source` and diff the result against `destination`.
    ///
    /// An absent destination counts as an empty document, so everything in
    /// the merged result is reported as added.
    pub fn plan(&self, source: &str, overrides: &OverrideSpec, destination: Option<&str>) -> Result<ChangePlan> {
        let output = self.merge(source, overrides)?;
        let current = match destination {
            Some(text) => self.normalize(text)?,
            None => ConfigValue::empty_section(),
        };
        let (report, has_changes) = diff(&current, &output.tree);
        tracing::debug!(format = %self.format, has_changes, "Planned change");

        Ok(ChangePlan {
            rendered: output.rendered,
            merged: output.tree,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigTemplateError;
    use serde_json::json;

    #[test]
    fn test_unknown_format_selector() {
        let err = "toml".parse::<ConfigFormat>().unwrap_err();
        assert!(matches!(err, ConfigTemplateError::UnknownFormat { .. }));
    }

    #[test]
    fn test_json_merge_output_and_tree() {
        let overrides = OverrideSpec::from_json(json!({"x": [3], "b": "new"}));
        let output = merge_overrides(
            ConfigFormat::Json,
            r#"{"x": [1, 2], "a": true}"#,
            &overrides,
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(output.tree.to_json(), json!({"a": true, "b": "new", "x": [1, 2, 3]}));
        insta::assert_snapshot!(output.rendered, @r#"
        {
            "a": true,
            "b": "new",
            "x": [
                1,
                2,
                3
            ]
        }
        "#);
    }

    #[test]
    fn test_yaml_merge() {
        let overrides = OverrideSpec::from_yaml_str("hosts: !prefer [c]\nport: 81\n").unwrap();
        let output = merge_overrides(
            ConfigFormat::Yaml,
            "port: 80\nhosts:\n  - a\n  - b\n",
            &overrides,
            &MergeOptions::default(),
        )
        .unwrap();
        assert_eq!(output.rendered, "hosts:\n  - c\nport: 81\n");
    }

    #[test]
    fn test_malformed_document() {
        let err = merge_overrides(
            ConfigFormat::Json,
            "{not json",
            &OverrideSpec::empty(),
            &MergeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigTemplateError::MalformedInput { .. }));
    }

    #[test]
    fn test_ini_normalized_tree() {
        let template = ConfigTemplate::new(ConfigFormat::Ini, MergeOptions::default());
        let tree = template.normalize("[DEFAULT]\na = 1\n[s]\na = 1\nb = 2\n").unwrap();
        assert_eq!(tree.to_json(), json!({"DEFAULT": {"a": "1"}, "s": {"b": "2"}}));
    }

    #[test]
    fn test_plan_against_missing_destination() {
        let template = ConfigTemplate::new(ConfigFormat::Json, MergeOptions::default());
        let plan = template
            .plan(r#"{"a": 1}"#, &OverrideSpec::empty(), None)
            .unwrap();
        assert!(plan.has_changes());
        assert_eq!(plan.report.added.to_json(), json!({"a": 1}));
    }

    #[test]
    fn test_plan_without_changes() {
        let template = ConfigTemplate::new(ConfigFormat::Ini, MergeOptions::default());
        let source = "[s]\nk = v\n";
        let plan = template
            .plan(source, &OverrideSpec::empty(), Some(source))
            .unwrap();
        assert!(!plan.has_changes());
        assert_eq!(plan.rendered, "[s]\nk = v\n\n");
    }

    #[test]
    fn test_plan_reports_override_changes() {
        let template = ConfigTemplate::new(ConfigFormat::Ini, MergeOptions::default());
        let overrides = OverrideSpec::from_json(json!({"s": {"k": "w", "extra": "1"}}));
        let plan = template
            .plan("[s]\nk = v\n", &overrides, Some("[s]\nk = v\n"))
            .unwrap();
        assert_eq!(
            plan.report.to_tree().to_json(),
            json!({
                "added": {"s": {"extra": "1"}},
                "changed": {"s": {"k": {"current": "v", "new": "w"}}},
                "removed": {},
            })
        );
    }
}

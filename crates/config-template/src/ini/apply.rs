//! Applying override specifications to INI documents.

use super::{DEFAULT_SECTION, IniDocument};
use crate::error::{ConfigTemplateError, Result};
use crate::overrides::{OverrideKind, OverrideNode, OverrideSpec, split_list};
use crate::value::{ConfigValue, MultiSet, Scalar};

/// Apply `spec` to `doc` key by key.
///
/// A top-level mapping addresses the section of the same name, which is
/// created if missing; every key inside it replaces the section's existing
/// entries for that key. Any other top-level value sets the key of the same
/// name in the default section.
///
/// # Errors
///
/// - [`ConfigTemplateError::MalformedInput`] if the spec is not a mapping
/// - [`ConfigTemplateError::AmbiguousKey`] if a new default key matches
///   several commented template lines
pub fn apply_overrides(doc: &mut IniDocument, spec: &OverrideSpec) -> Result<()> {
    let default_section = doc.default_section().to_string();
    if default_section != DEFAULT_SECTION {
        doc.ensure_section(&default_section);
    }

    let entries = spec.entries().ok_or_else(|| {
        ConfigTemplateError::malformed("ini", "overrides must be a mapping of sections to options")
    })?;

    for (key, node) in entries {
        match node.as_map() {
            Some(options) => {
                doc.ensure_section(key);
                for (option, value) in options {
                    apply_option(doc, key, option, value)?;
                }
            }
            None => apply_option(doc, &default_section, key, node)?,
        }
    }

    Ok(())
}

fn apply_option(doc: &mut IniDocument, section: &str, key: &str, node: &OverrideNode) -> Result<()> {
    tracing::debug!(section, key, "Applying override");
    doc.remove_option(section, key)?;
    doc.set(section, key, coerce(node))
}

/// Flatten an override node into something one INI option can hold.
///
/// - a mapping whose members are all falsy: a set of its keys
/// - any other mapping: its compact JSON text
/// - a set: the set
/// - a list or a `!split` string: members joined with commas
/// - null: an empty value
/// - anything else: its string form
fn coerce(node: &OverrideNode) -> ConfigValue {
    match &node.kind {
        OverrideKind::Map(map) if map.values().all(OverrideNode::is_falsy) => {
            ConfigValue::MultiSet(map.keys().cloned().collect::<MultiSet>())
        }
        OverrideKind::Map(_) => ConfigValue::string(node.to_config_value().to_json().to_string()),
        OverrideKind::MultiSet(set) => ConfigValue::MultiSet(set.clone()),
        OverrideKind::List(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| item.to_config_value().to_string())
                .collect();
            ConfigValue::string(parts.join(","))
        }
        OverrideKind::Split(text) => ConfigValue::string(split_list(text).to_string()),
        OverrideKind::Literal(text) => ConfigValue::string(text.clone()),
        OverrideKind::Scalar(Scalar::Null) => ConfigValue::string(""),
        OverrideKind::Scalar(scalar) => ConfigValue::string(scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(text: &str, overrides: serde_json::Value) -> IniDocument {
        let mut doc = IniDocument::parse(text, DEFAULT_SECTION);
        apply_overrides(&mut doc, &OverrideSpec::from_json(overrides)).unwrap();
        doc
    }

    #[test]
    fn test_section_override_replaces_existing_entries() {
        let doc = apply("[s]\nk = a\nk = b\nother = 1\n", json!({"s": {"k": "c"}}));
        assert_eq!(doc.write(true), "[s]\nother = 1\nk = c\n\n");
    }

    #[test]
    fn test_missing_section_is_created() {
        let doc = apply("[a]\nx = 1\n", json!({"b": {"y": 2}}));
        assert_eq!(doc.write(true), "[a]\nx = 1\n\n[b]\ny = 2\n\n");
    }

    #[test]
    fn test_scalar_top_level_targets_default_section() {
        let doc = apply("[a]\nx = 1\n", json!({"debug": true, "hosts": ["h1", "h2"]}));
        insta::assert_snapshot!(doc.write(true), @r"
        debug = true
        hosts = h1,h2

        [a]
        x = 1
        ");
    }

    #[test]
    fn test_all_falsy_mapping_becomes_multiset() {
        let doc = apply("", json!({"s": {"k": {"var2": null, "var1": ""}}}));
        assert_eq!(doc.write(true), "[s]\nk = var1\nk = var2\n\n");
    }

    #[test]
    fn test_truthy_mapping_becomes_json() {
        let doc = apply("", json!({"s": {"k": {"b": 1, "a": "x"}}}));
        assert_eq!(doc.write(true), "[s]\nk = {\"a\":\"x\",\"b\":1}\n\n");
    }

    #[test]
    fn test_null_override_keeps_key_with_empty_value() {
        let doc = apply("[s]\nkey = old\nport = 1\n", json!({"s": {"key": null}}));
        assert_eq!(doc.write(true), "[s]\nport = 1\nkey = \n\n");
        assert_eq!(
            doc.section("s").and_then(|s| s.get("key")),
            Some(&ConfigValue::string(""))
        );
    }

    #[test]
    fn test_split_override_is_comma_joined() {
        let mut doc = IniDocument::parse("[s]\n", DEFAULT_SECTION);
        let spec = OverrideSpec::from_yaml_str("s:\n  hosts: !split \"a\\nb, c\"\n").unwrap();
        apply_overrides(&mut doc, &spec).unwrap();
        assert_eq!(doc.write(true), "[s]\nhosts = a,b,c\n\n");
    }

    #[test]
    fn test_override_in_indented_section() {
        let doc = apply(
            "[mysqld]\n  port = 3306\n  bind-address = 0.0.0.0\n",
            json!({"mysqld": {"bind-address": "127.0.0.1"}}),
        );
        assert_eq!(doc.write(true), "[mysqld]\nport = 3306\nbind-address = 127.0.0.1\n\n");
    }

    #[test]
    fn test_override_uses_commented_template_position() {
        let doc = apply("# options\n#debug = false\n#verbose = false\n[a]\n", json!({"verbose": true}));
        assert_eq!(
            doc.write(true),
            "# options\n#debug = false\n#verbose = false\nverbose = true\n\n[a]\n\n"
        );
    }

    #[test]
    fn test_ambiguous_template_fails() {
        let mut doc = IniDocument::parse("#log = 1\n#log_file = x\n", DEFAULT_SECTION);
        let err = apply_overrides(&mut doc, &OverrideSpec::from_json(json!({"log": 2}))).unwrap_err();
        assert!(matches!(err, ConfigTemplateError::AmbiguousKey { .. }));
    }

    #[test]
    fn test_custom_default_section_is_created() {
        let mut doc = IniDocument::parse("[other]\na = 1\n", "main");
        apply_overrides(&mut doc, &OverrideSpec::from_json(json!({"flag": "on"}))).unwrap();
        assert_eq!(doc.write(true), "[main]\nflag = on\n\n[other]\na = 1\n\n");
    }

    #[test]
    fn test_non_mapping_spec_is_rejected() {
        let mut doc = IniDocument::new(DEFAULT_SECTION);
        let err = apply_overrides(&mut doc, &OverrideSpec::from_json(json!(["a"]))).unwrap_err();
        assert!(matches!(err, ConfigTemplateError::MalformedInput { .. }));
    }
}

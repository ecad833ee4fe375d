//! Integration test: JSON and YAML documents through merge and diff.

use config_template::{
    ConfigFormat, ConfigTemplate, ConfigValue, MergeOptions, OverrideSpec, SplitMode, diff,
    merge_overrides,
};
use serde_json::json;

fn merge_json(document: serde_json::Value, overrides: serde_json::Value, options: MergeOptions) -> serde_json::Value {
    merge_overrides(
        ConfigFormat::Json,
        &document.to_string(),
        &OverrideSpec::from_json(overrides),
        &options,
    )
    .unwrap()
    .tree
    .to_json()
}

#[test]
fn test_list_extend_and_replace() {
    assert_eq!(
        merge_json(json!({"x": [1, 2]}), json!({"x": [3]}), MergeOptions::default()),
        json!({"x": [1, 2, 3]})
    );
    assert_eq!(
        merge_json(
            json!({"x": [1, 2]}),
            json!({"x": [3]}),
            MergeOptions::default().with_extend_lists(false)
        ),
        json!({"x": [3]})
    );
}

#[test]
fn test_comma_string_becomes_list() {
    assert_eq!(
        merge_json(json!({}), json!({"a": "1,2,3"}), MergeOptions::default()),
        json!({"a": ["1", "2", "3"]})
    );
}

#[test]
fn test_explicit_split_mode_needs_tag() {
    let options = MergeOptions::default().with_split_mode(SplitMode::Explicit);
    let overrides = OverrideSpec::from_yaml_str("motd: Hello, world\nhosts: !split a,b\n").unwrap();
    let output = merge_overrides(ConfigFormat::Json, "{}", &overrides, &options).unwrap();
    assert_eq!(
        output.tree.to_json(),
        json!({"motd": "Hello, world", "hosts": ["a", "b"]})
    );
}

#[test]
fn test_yaml_document_with_tagged_overrides() {
    let document = r#"
service:
  name: api
  ports:
    - 80
    - 443
  env:
    LOG_LEVEL: info
"#;
    let overrides = OverrideSpec::from_yaml_str(
        r#"
service:
  ports: [8080]
  env: !prefer
    LOG_LEVEL: debug
"#,
    )
    .unwrap();

    let output = merge_overrides(ConfigFormat::Yaml, document, &overrides, &MergeOptions::default()).unwrap();
    insta::assert_snapshot!(output.rendered, @r"
    service:
      env:
        LOG_LEVEL: debug
      name: api
      ports:
        - 80
        - 443
        - 8080
    ");
}

#[test]
fn test_yaml_multiline_strings() {
    let overrides = OverrideSpec::from_yaml_str("banner: !str \"line one\\nline two\"\n").unwrap();

    let options = MergeOptions::default().with_preserve_multiline_strings(true);
    let output = merge_overrides(ConfigFormat::Yaml, "", &overrides, &options).unwrap();
    assert_eq!(output.tree.to_json(), json!({"banner": "line one\nline two"}));
    assert!(output.rendered.contains('|'));
}

#[test]
fn test_diff_properties() {
    let (report, has_changes) = diff(
        &ConfigValue::from(json!({"a": 1, "b": 2})),
        &ConfigValue::from(json!({"a": 1, "c": 3})),
    );
    assert!(has_changes);
    assert_eq!(report.added.to_json(), json!({"c": 3}));
    assert_eq!(report.removed.to_json(), json!({"b": 2}));
    assert_eq!(report.changed.to_json(), json!({}));

    let (report, has_changes) = diff(
        &ConfigValue::from(json!({"s": {"a": 1}})),
        &ConfigValue::from(json!({"s": {"a": 2}})),
    );
    assert!(has_changes);
    assert_eq!(
        report.changed.to_json(),
        json!({"s": {"a": {"current": 1, "new": 2}}})
    );
}

#[test]
fn test_empty_merge_diffs_clean() {
    let document = r#"{"b": {"c": [1, 2]}, "a": "x"}"#;
    let template = ConfigTemplate::new(ConfigFormat::Json, MergeOptions::default());

    let merged = template.merge(document, &OverrideSpec::empty()).unwrap();
    let original = template.normalize(document).unwrap();
    assert_eq!(merged.tree, original);

    let (report, has_changes) = diff(&original, &merged.tree);
    assert!(!has_changes);
    assert!(!report.has_changes());
}

#[test]
fn test_plan_prepared_diff() {
    let template = ConfigTemplate::new(ConfigFormat::Yaml, MergeOptions::default());
    let overrides = OverrideSpec::from_yaml_str("replicas: 3\nimage: app:2\n").unwrap();
    let plan = template
        .plan("image: app:1\n", &overrides, Some("image: app:1\nlegacy: true\n"))
        .unwrap();

    assert!(plan.has_changes());
    insta::assert_snapshot!(plan.report.to_prepared_json().unwrap(), @r#"
    {
        "added": {
            "replicas": 3
        },
        "changed": {
            "image": {
                "current": "app:1",
                "new": "app:2"
            }
        },
        "removed": {
            "legacy": true
        }
    }
    "#);
}

#[test]
fn test_sequence_documents_diff_as_sets() {
    let template = ConfigTemplate::new(ConfigFormat::Json, MergeOptions::default());
    let overrides = OverrideSpec::from_json(json!(["c"]));
    let plan = template.plan(r#"["a", "b"]"#, &overrides, Some(r#"["b", "a"]"#)).unwrap();

    assert_eq!(plan.merged.to_json(), json!(["a", "b", "c"]));
    assert_eq!(plan.report.added.to_json(), json!(["c"]));
    assert_eq!(plan.report.changed.to_json(), json!(["c"]));
}

#[test]
fn test_concat_split_tag_extends_existing_list() {
    let overrides = OverrideSpec::from_yaml_str("hosts: !concat_split c,d\n").unwrap();
    let options = MergeOptions::default().with_extend_lists(false);
    let output = merge_overrides(ConfigFormat::Json, r#"{"hosts": ["a", "b"]}"#, &overrides, &options).unwrap();
    assert_eq!(output.tree.to_json(), json!({"hosts": ["a", "b", "c", "d"]}));
}

#[test]
fn test_yaml_aliases_are_expanded() {
    let overrides = OverrideSpec::from_yaml_str("base: &port 8080\ns:\n  port: *port\n").unwrap();
    let output = merge_overrides(ConfigFormat::Json, "{}", &overrides, &MergeOptions::default()).unwrap();
    assert_eq!(output.tree.to_json(), json!({"base": 8080, "s": {"port": 8080}}));
}

//! Override specifications.
//!
//! An [`OverrideSpec`] is the caller-supplied tree of values to merge into a
//! document. Unlike a plain [`ConfigValue`], every node may carry explicit
//! intent: a [`MergeOp`] deciding whether collections are extended or
//! replaced, and for strings whether they are to be split into a list
//! ([`OverrideKind::Split`]) or kept whole ([`OverrideKind::Literal`]).
//!
//! Specs can be built in code, converted from a `ConfigValue` or
//! `serde_json::Value`, or parsed from tagged YAML:
//!
//! ```yaml
//! mysqld:
//!   bind-address: 0.0.0.0
//!   plugins: !split auth,audit
//! servers: !prefer [web1, web2]
//! motd: !str Hello, world
//! ```

use config_template_yaml::{TaggedYaml, Yaml, parse_tagged};
use indexmap::IndexMap;

use crate::error::{ConfigTemplateError, Result};
use crate::tag::{ValueIntent, parse_tag};
use crate::tree::{scalar_from_yaml, yaml_key};
use crate::value::{ConfigValue, MultiSet, Scalar};

/// Merge operation for an override node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOp {
    /// Replace the base value (from `!prefer`).
    ///
    /// For lists and sets: drops previous members
    /// For maps: replaces the whole map (no key-wise merge)
    Prefer,

    /// Extend the base value (from `!concat`).
    ///
    /// For lists and sets: appends members
    /// For maps: key-wise merge
    Concat,
}

/// The shape of an override node.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideKind {
    Scalar(Scalar),
    /// A string to be split on commas and newlines into a list.
    Split(String),
    /// A string that is never split, whatever the split mode.
    Literal(String),
    List(Vec<OverrideNode>),
    MultiSet(MultiSet),
    Map(IndexMap<String, OverrideNode>),
}

/// One node of an override tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideNode {
    pub kind: OverrideKind,

    /// Explicit merge operation (None means follow `extend_lists`)
    pub merge_op: Option<MergeOp>,
}

impl OverrideNode {
    pub fn new(kind: OverrideKind) -> Self {
        Self { kind, merge_op: None }
    }

    pub fn scalar(value: Scalar) -> Self {
        Self::new(OverrideKind::Scalar(value))
    }

    pub fn split(text: impl Into<String>) -> Self {
        Self::new(OverrideKind::Split(text.into()))
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(OverrideKind::Literal(text.into()))
    }

    pub fn list(items: Vec<OverrideNode>) -> Self {
        Self::new(OverrideKind::List(items))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, OverrideNode)>) -> Self {
        Self::new(OverrideKind::Map(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn with_merge_op(mut self, op: MergeOp) -> Self {
        self.merge_op = Some(op);
        self
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, OverrideNode>> {
        match &self.kind {
            OverrideKind::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether the node counts as "empty" for override coercion.
    pub fn is_falsy(&self) -> bool {
        match &self.kind {
            OverrideKind::Scalar(s) => s.is_falsy(),
            OverrideKind::Split(text) | OverrideKind::Literal(text) => text.is_empty(),
            OverrideKind::List(items) => items.is_empty(),
            OverrideKind::MultiSet(set) => set.is_empty(),
            OverrideKind::Map(map) => map.is_empty(),
        }
    }

    /// The plain value this node stands for, with split strings expanded.
    pub fn to_config_value(&self) -> ConfigValue {
        match &self.kind {
            OverrideKind::Scalar(s) => ConfigValue::Scalar(s.clone()),
            OverrideKind::Split(text) => split_list(text),
            OverrideKind::Literal(text) => ConfigValue::string(text.clone()),
            OverrideKind::List(items) => {
                ConfigValue::List(items.iter().map(Self::to_config_value).collect())
            }
            OverrideKind::MultiSet(set) => ConfigValue::MultiSet(set.clone()),
            OverrideKind::Map(map) => ConfigValue::Section(
                map.iter()
                    .map(|(k, v)| (k.as_str(), v.to_config_value()))
                    .collect(),
            ),
        }
    }
}

/// Split on commas and newlines, trimming segments and dropping empty ones.
pub(crate) fn split_list(text: &str) -> ConfigValue {
    ConfigValue::List(
        text.split([',', '\n'])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(ConfigValue::string)
            .collect(),
    )
}

impl From<ConfigValue> for OverrideNode {
    fn from(value: ConfigValue) -> Self {
        let kind = match value {
            ConfigValue::Scalar(s) => OverrideKind::Scalar(s),
            ConfigValue::List(items) => {
                OverrideKind::List(items.into_iter().map(Self::from).collect())
            }
            ConfigValue::MultiSet(set) => OverrideKind::MultiSet(set),
            ConfigValue::Section(map) => OverrideKind::Map(
                map.iter()
                    .map(|(k, v)| (k.to_string(), Self::from(v.clone())))
                    .collect(),
            ),
        };
        Self::new(kind)
    }
}

/// A complete override specification.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideSpec {
    root: OverrideNode,
}

impl Default for OverrideSpec {
    fn default() -> Self {
        Self::empty()
    }
}

impl OverrideSpec {
    /// A spec that changes nothing.
    pub fn empty() -> Self {
        Self {
            root: OverrideNode::new(OverrideKind::Map(IndexMap::new())),
        }
    }

    pub fn new(root: OverrideNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &OverrideNode {
        &self.root
    }

    /// Top-level entries, if the spec is a mapping.
    pub fn entries(&self) -> Option<impl Iterator<Item = (&str, &OverrideNode)>> {
        self.root
            .as_map()
            .map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.root.kind, OverrideKind::Map(map) if map.is_empty())
    }

    /// Convert a JSON value. No tags are available, so no node carries
    /// explicit intent.
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::from(ConfigValue::from(value))
    }

    /// Parse tagged YAML.
    ///
    /// An empty document is an empty spec.
    ///
    /// # Errors
    ///
    /// - [`ConfigTemplateError::MalformedInput`] if the YAML does not parse
    /// - [`ConfigTemplateError::InvalidTag`] if a tag is malformed
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }
        let tagged = parse_tagged(content).map_err(|e| ConfigTemplateError::malformed("yaml", e))?;
        if matches!(tagged.yaml, Yaml::Null) && tagged.tag.is_none() {
            return Ok(Self::empty());
        }
        Ok(Self::new(node_from_tagged(tagged)?))
    }
}

impl From<ConfigValue> for OverrideSpec {
    fn from(value: ConfigValue) -> Self {
        Self::new(OverrideNode::from(value))
    }
}

impl From<OverrideNode> for OverrideSpec {
    fn from(root: OverrideNode) -> Self {
        Self::new(root)
    }
}

fn node_from_tagged(tagged: TaggedYaml) -> Result<OverrideNode> {
    let parsed = match tagged.tag.as_deref() {
        Some(tag) => parse_tag(tag)?,
        None => Default::default(),
    };

    let kind = if tagged.is_hash() {
        let mut map = IndexMap::new();
        for entry in tagged.into_hash().unwrap_or_default() {
            let position = entry.key.position;
            let key = yaml_key(&entry.key.yaml).ok_or_else(|| {
                ConfigTemplateError::malformed(
                    "yaml",
                    format!(
                        "unsupported mapping key at line {}, column {}",
                        position.line, position.col
                    ),
                )
            })?;
            map.insert(key, node_from_tagged(entry.value)?);
        }
        warn_unused_intent(parsed.intent, "mapping");
        OverrideKind::Map(map)
    } else if tagged.is_array() {
        let items = tagged
            .into_array()
            .unwrap_or_default()
            .into_iter()
            .map(node_from_tagged)
            .collect::<Result<Vec<_>>>()?;
        warn_unused_intent(parsed.intent, "sequence");
        OverrideKind::List(items)
    } else {
        let scalar = scalar_from_yaml(tagged.yaml);
        match parsed.intent {
            Some(ValueIntent::Split) => OverrideKind::Split(scalar_text(&scalar)),
            Some(ValueIntent::Literal) => OverrideKind::Literal(scalar_text(&scalar)),
            None => OverrideKind::Scalar(scalar),
        }
    };

    Ok(OverrideNode {
        kind,
        merge_op: parsed.merge_op,
    })
}

fn warn_unused_intent(intent: Option<ValueIntent>, shape: &str) {
    if let Some(intent) = intent {
        tracing::warn!(?intent, shape, "Value intent tags only apply to scalars; ignoring");
    }
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_yaml_is_empty_spec() {
        assert!(OverrideSpec::from_yaml_str("").unwrap().is_empty());
        assert!(OverrideSpec::from_yaml_str("# nothing\n").unwrap().is_empty());
        assert!(OverrideSpec::from_yaml_str("~").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_tags_become_intent() {
        let spec = OverrideSpec::from_yaml_str(
            "plugins: !split auth,audit\nservers: !prefer [web1]\nmotd: !str Hello, world\n",
        )
        .unwrap();
        let map = spec.root().as_map().unwrap();

        assert_eq!(map["plugins"].kind, OverrideKind::Split("auth,audit".into()));
        assert_eq!(map["servers"].merge_op, Some(MergeOp::Prefer));
        assert_eq!(map["motd"].kind, OverrideKind::Literal("Hello, world".into()));
    }

    #[test]
    fn test_yaml_keeps_scalar_types() {
        let spec = OverrideSpec::from_yaml_str("port: 8080\ndebug: true\nratio: 0.5\nname: web\n").unwrap();
        let map = spec.root().as_map().unwrap();
        assert_eq!(map["port"].kind, OverrideKind::Scalar(Scalar::Integer(8080)));
        assert_eq!(map["debug"].kind, OverrideKind::Scalar(Scalar::Bool(true)));
        assert_eq!(map["ratio"].kind, OverrideKind::Scalar(Scalar::Real("0.5".into())));
        assert_eq!(map["name"].kind, OverrideKind::Scalar(Scalar::String("web".into())));
    }

    #[test]
    fn test_yaml_invalid_tag_fails() {
        let err = OverrideSpec::from_yaml_str("a: !prefer_concat [1]\n").unwrap_err();
        assert!(matches!(err, ConfigTemplateError::InvalidTag { .. }));
    }

    #[test]
    fn test_yaml_syntax_error_is_malformed() {
        let err = OverrideSpec::from_yaml_str("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, ConfigTemplateError::MalformedInput { ref format, .. } if format == "yaml"));
    }

    #[test]
    fn test_from_json_preserves_order_of_sections() {
        let spec = OverrideSpec::from_json(json!({"b": {"x": 1}, "a": [1, 2]}));
        let keys: Vec<&str> = spec.entries().unwrap().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 2);
        assert!(spec.root().as_map().unwrap()["a"].merge_op.is_none());
    }

    #[test]
    fn test_to_config_value_expands_split() {
        let node = OverrideNode::split(" a, b ,,\nc ");
        assert_eq!(
            node.to_config_value(),
            ConfigValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_falsy_nodes() {
        assert!(OverrideNode::scalar(Scalar::Null).is_falsy());
        assert!(OverrideNode::list(vec![]).is_falsy());
        assert!(!OverrideNode::literal("x").is_falsy());
        assert!(!OverrideNode::map([("k", OverrideNode::scalar(Scalar::Null))]).is_falsy());
    }
}

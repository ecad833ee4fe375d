//! YAML parser that builds TaggedYaml trees.

use std::collections::HashMap;

use crate::{Error, Position, Result, TaggedEntry, TaggedYaml};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::{Yaml, YamlLoader};

/// Handles that denote the YAML core schema (`!!str` and friends).
const CORE_TAG_HANDLES: &[&str] = &["!!", "tag:yaml.org,2002:"];

/// Load a plain YAML document.
///
/// Only the first document of a stream is returned. An empty stream yields
/// `Yaml::Null`.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the scanner rejects the input.
pub fn load(content: &str) -> Result<Yaml> {
    let mut docs = YamlLoader::load_from_str(content)?;
    if docs.is_empty() {
        return Ok(Yaml::Null);
    }
    Ok(docs.swap_remove(0))
}

/// Parse YAML keeping local tags on every node.
///
/// # Example
///
/// ```rust
/// use config_template_yaml::parse_tagged;
///
/// let yaml = parse_tagged("hosts: !split a,b").unwrap();
/// let hosts = yaml.get_hash_value("hosts").unwrap();
/// assert_eq!(hosts.tag.as_deref(), Some("split"));
/// assert_eq!(hosts.yaml.as_str(), Some("a,b"));
/// ```
///
/// An empty stream yields an untagged `Yaml::Null` node, as with [`load`].
///
/// # Errors
///
/// Returns an error if the YAML is invalid.
pub fn parse_tagged(content: &str) -> Result<TaggedYaml> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = TaggedBuilder::default();

    parser.load(&mut builder, false)?;

    builder.result()
}

#[derive(Default)]
struct TaggedBuilder {
    stack: Vec<BuildNode>,
    root: Option<TaggedYaml>,
    anchors: HashMap<usize, TaggedYaml>,
    error: Option<Error>,
}

enum BuildNode {
    Sequence {
        anchor_id: usize,
        position: Position,
        tag: Option<String>,
        items: Vec<TaggedYaml>,
    },
    Mapping {
        anchor_id: usize,
        position: Position,
        tag: Option<String>,
        entries: Vec<(TaggedYaml, Option<TaggedYaml>)>,
    },
}

/// A tag as seen by the builder: either a core-schema tag or a local one.
enum SeenTag {
    Core(String),
    Local(String),
}

impl TaggedBuilder {
    fn result(self) -> Result<TaggedYaml> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self.root.unwrap_or_else(|| {
            TaggedYaml::new_scalar(Yaml::Null, None, Position { line: 1, col: 1 })
        }))
    }

    /// Attach a finished node to its parent. A non-zero `anchor_id` records
    /// the node so later aliases can refer to it.
    fn push_complete(&mut self, anchor_id: usize, node: TaggedYaml) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(node);
            return;
        };

        match parent {
            BuildNode::Sequence { items, .. } => items.push(node),
            BuildNode::Mapping { entries, .. } => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(node),
                _ => entries.push((node, None)),
            },
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(Error::InvalidStructure(message.into()));
        }
    }
}

fn position_of(marker: &Marker) -> Position {
    Position {
        line: marker.line(),
        col: marker.col() + 1,
    }
}

fn classify_tag(handle: &str, suffix: &str) -> SeenTag {
    if CORE_TAG_HANDLES.contains(&handle) {
        SeenTag::Core(suffix.to_string())
    } else {
        SeenTag::Local(suffix.to_string())
    }
}

fn local_tag(tag: Option<SeenTag>) -> Option<String> {
    match tag {
        Some(SeenTag::Local(suffix)) => Some(suffix),
        _ => None,
    }
}

/// Resolve a scalar to its typed value.
///
/// Quoted and block scalars are always strings; plain scalars follow the
/// core schema unless a core tag says otherwise.
fn resolve_scalar(value: String, style: TScalarStyle, tag: Option<&SeenTag>) -> Yaml {
    match tag {
        Some(SeenTag::Core(suffix)) if suffix == "str" => Yaml::String(value),
        Some(SeenTag::Core(_)) => Yaml::from_str(&value),
        _ if style != TScalarStyle::Plain => Yaml::String(value),
        _ => Yaml::from_str(&value),
    }
}

impl MarkedEventReceiver for TaggedBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Scalar(value, style, anchor_id, tag) => {
                let tag = tag.map(|t| classify_tag(&t.handle, &t.suffix));
                let yaml = resolve_scalar(value, style, tag.as_ref());
                let node = TaggedYaml::new_scalar(yaml, local_tag(tag), position_of(&marker));
                self.push_complete(anchor_id, node);
            }

            Event::SequenceStart(anchor_id, tag) => {
                let tag = tag.map(|t| classify_tag(&t.handle, &t.suffix));
                self.stack.push(BuildNode::Sequence {
                    anchor_id,
                    position: position_of(&marker),
                    tag: local_tag(tag),
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => match self.stack.pop() {
                Some(BuildNode::Sequence {
                    anchor_id,
                    position,
                    tag,
                    items,
                }) => {
                    let node = TaggedYaml::new_array(items, tag, position);
                    self.push_complete(anchor_id, node);
                }
                _ => self.fail("sequence end without matching start"),
            },

            Event::MappingStart(anchor_id, tag) => {
                let tag = tag.map(|t| classify_tag(&t.handle, &t.suffix));
                self.stack.push(BuildNode::Mapping {
                    anchor_id,
                    position: position_of(&marker),
                    tag: local_tag(tag),
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => match self.stack.pop() {
                Some(BuildNode::Mapping {
                    anchor_id,
                    position,
                    tag,
                    entries,
                }) => {
                    let mut complete = Vec::with_capacity(entries.len());
                    for (key, value) in entries {
                        match value {
                            Some(value) => complete.push(TaggedEntry { key, value }),
                            None => {
                                self.fail("mapping entry without value");
                                return;
                            }
                        }
                    }
                    let node = TaggedYaml::new_hash(complete, tag, position);
                    self.push_complete(anchor_id, node);
                }
                _ => self.fail("mapping end without matching start"),
            },

            Event::Alias(anchor_id) => match self.anchors.get(&anchor_id).cloned() {
                Some(node) => self.push_complete(0, node),
                None => self.fail(format!("unknown alias at line {}", marker.line())),
            },

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_mapping() {
        let yaml = load("a: 1\nb: [x, y]\n").unwrap();
        assert_eq!(yaml["a"].as_i64(), Some(1));
        assert_eq!(yaml["b"].as_vec().map(Vec::len), Some(2));
    }

    #[test]
    fn test_load_empty_stream() {
        assert_eq!(load("").unwrap(), Yaml::Null);
    }

    #[test]
    fn test_load_syntax_error() {
        let err = load("a: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_tagged_empty_stream() {
        let yaml = parse_tagged("# only a comment\n").unwrap();
        assert_eq!(yaml.yaml, Yaml::Null);
        assert!(yaml.tag.is_none());
    }

    #[test]
    fn test_parse_plain_scalars_are_typed() {
        let yaml = parse_tagged("n: 42\nf: 1.5\nb: true\nz: ~\ns: hello").unwrap();
        assert_eq!(yaml.get_hash_value("n").unwrap().yaml, Yaml::Integer(42));
        assert_eq!(
            yaml.get_hash_value("f").unwrap().yaml,
            Yaml::Real("1.5".into())
        );
        assert_eq!(yaml.get_hash_value("b").unwrap().yaml, Yaml::Boolean(true));
        assert_eq!(yaml.get_hash_value("z").unwrap().yaml, Yaml::Null);
        assert_eq!(
            yaml.get_hash_value("s").unwrap().yaml.as_str(),
            Some("hello")
        );
    }

    #[test]
    fn test_parse_quoted_scalars_stay_strings() {
        let yaml = parse_tagged("port: \"8080\"\nflag: 'true'").unwrap();
        assert_eq!(
            yaml.get_hash_value("port").unwrap().yaml.as_str(),
            Some("8080")
        );
        assert_eq!(
            yaml.get_hash_value("flag").unwrap().yaml.as_str(),
            Some("true")
        );
    }

    #[test]
    fn test_core_str_tag_is_resolved_not_reported() {
        let yaml = parse_tagged("port: !!str 8080").unwrap();
        let port = yaml.get_hash_value("port").unwrap();
        assert_eq!(port.yaml.as_str(), Some("8080"));
        assert!(port.tag.is_none());
    }

    #[test]
    fn test_local_tags_on_every_node_kind() {
        let yaml = parse_tagged(
            "a: !prefer [1]\nb: !concat {x: 1}\nc: !split 'p, q'\n",
        )
        .unwrap();
        assert_eq!(yaml.get_hash_value("a").unwrap().tag.as_deref(), Some("prefer"));
        assert_eq!(yaml.get_hash_value("b").unwrap().tag.as_deref(), Some("concat"));
        assert_eq!(yaml.get_hash_value("c").unwrap().tag.as_deref(), Some("split"));
        assert!(yaml.tag.is_none());
    }

    #[test]
    fn test_aliases_expand_to_anchored_nodes() {
        let yaml = parse_tagged(
            "port: &p !prefer 8080\nhosts: &h [a, b]\nuse:\n  port: *p\n  hosts: *h\n",
        )
        .unwrap();
        let used = yaml.get_hash_value("use").unwrap();

        let port = used.get_hash_value("port").unwrap();
        assert_eq!(port.yaml, Yaml::Integer(8080));
        assert_eq!(port.tag.as_deref(), Some("prefer"));

        let hosts = used.get_hash_value("hosts").unwrap();
        assert!(hosts.is_array());
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn test_positions_are_one_based() {
        let yaml = parse_tagged("first: 1\nsecond: 2").unwrap();
        let second = yaml.get_hash_value("second").unwrap();
        assert_eq!(second.position.line, 2);
        assert!(second.position.col >= 1);
    }

    #[test]
    fn test_nested_structure() {
        let yaml = parse_tagged(
            r#"
mysqld:
  bind-address: 0.0.0.0
  plugins:
    - auth
    - audit
"#,
        )
        .unwrap();

        let mysqld = yaml.get_hash_value("mysqld").unwrap();
        assert!(mysqld.is_hash());
        let plugins = mysqld.get_hash_value("plugins").unwrap();
        assert!(plugins.is_array());
        assert_eq!(plugins.len(), 2);
    }
}

//! YAML value with its local tag and position.

use yaml_rust2::Yaml;

/// 1-based line and column of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

/// A YAML value together with the local tag it was written with.
///
/// Like the plain `Yaml` tree, but each node also carries:
/// - the suffix of a local tag (`"prefer"` for `!prefer`), if any
/// - the position of the node
/// - tagged children for sequences and mappings
///
/// Core-schema tags (`!!str`, `!!int`, ...) are resolved while parsing and are
/// not reported in `tag`.
#[derive(Debug, Clone)]
pub struct TaggedYaml {
    /// The complete value with tags stripped.
    pub yaml: Yaml,

    /// Local tag suffix (without the leading `!`).
    pub tag: Option<String>,

    /// Where the node starts.
    pub position: Position,

    children: Children,
}

#[derive(Debug, Clone)]
enum Children {
    None,
    Array(Vec<TaggedYaml>),
    Hash(Vec<TaggedEntry>),
}

/// A key/value pair of a tagged mapping.
#[derive(Debug, Clone)]
pub struct TaggedEntry {
    pub key: TaggedYaml,
    pub value: TaggedYaml,
}

impl TaggedYaml {
    /// Create a leaf node.
    pub fn new_scalar(yaml: Yaml, tag: Option<String>, position: Position) -> Self {
        Self {
            yaml,
            tag,
            position,
            children: Children::None,
        }
    }

    /// Create a sequence node from its tagged items.
    pub fn new_array(items: Vec<TaggedYaml>, tag: Option<String>, position: Position) -> Self {
        let yaml = Yaml::Array(items.iter().map(|item| item.yaml.clone()).collect());
        Self {
            yaml,
            tag,
            position,
            children: Children::Array(items),
        }
    }

    /// Create a mapping node from its tagged entries.
    pub fn new_hash(entries: Vec<TaggedEntry>, tag: Option<String>, position: Position) -> Self {
        let yaml = Yaml::Hash(
            entries
                .iter()
                .map(|entry| (entry.key.yaml.clone(), entry.value.yaml.clone()))
                .collect(),
        );
        Self {
            yaml,
            tag,
            position,
            children: Children::Hash(entries),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.children, Children::Array(_))
    }

    pub fn is_hash(&self) -> bool {
        matches!(self.children, Children::Hash(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.children, Children::None)
    }

    /// Number of children (0 for scalars).
    pub fn len(&self) -> usize {
        match &self.children {
            Children::None => 0,
            Children::Array(items) => items.len(),
            Children::Hash(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_array(&self) -> Option<&[TaggedYaml]> {
        match &self.children {
            Children::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&[TaggedEntry]> {
        match &self.children {
            Children::Hash(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a mapping value by string key.
    pub fn get_hash_value(&self, key: &str) -> Option<&TaggedYaml> {
        self.as_hash()?
            .iter()
            .find(|entry| entry.key.yaml.as_str() == Some(key))
            .map(|entry| &entry.value)
    }

    /// Consume the node, yielding its items if it is a sequence.
    pub fn into_array(self) -> Option<Vec<TaggedYaml>> {
        match self.children {
            Children::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Consume the node, yielding its entries if it is a mapping.
    pub fn into_hash(self) -> Option<Vec<TaggedEntry>> {
        match self.children {
            Children::Hash(entries) => Some(entries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> TaggedYaml {
        TaggedYaml::new_scalar(Yaml::String(s.into()), None, Position::default())
    }

    #[test]
    fn test_array_mirrors_items() {
        let node = TaggedYaml::new_array(
            vec![scalar("a"), scalar("b")],
            Some("concat".into()),
            Position::default(),
        );
        assert!(node.is_array());
        assert_eq!(node.len(), 2);
        assert_eq!(
            node.yaml,
            Yaml::Array(vec![Yaml::String("a".into()), Yaml::String("b".into())])
        );
    }

    #[test]
    fn test_hash_lookup() {
        let node = TaggedYaml::new_hash(
            vec![TaggedEntry {
                key: scalar("name"),
                value: scalar("value"),
            }],
            None,
            Position::default(),
        );
        assert!(node.is_hash());
        assert_eq!(
            node.get_hash_value("name").and_then(|v| v.yaml.as_str()),
            Some("value")
        );
        assert!(node.get_hash_value("missing").is_none());
    }

    #[test]
    fn test_scalar_has_no_children() {
        let node = scalar("x");
        assert!(node.is_scalar());
        assert!(node.is_empty());
        assert!(node.as_array().is_none());
        assert!(node.into_hash().is_none());
    }
}

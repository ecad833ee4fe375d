//! JSON and YAML documents as [`ConfigValue`] trees.

use config_template_yaml::{Hash, Yaml};
use serde::Serialize;

use crate::error::{ConfigTemplateError, Result};
use crate::multimap::OrderedMultiMap;
use crate::value::{ConfigValue, Scalar};

/// Decode a JSON document. The root must be an object or an array.
///
/// # Errors
///
/// [`ConfigTemplateError::MalformedInput`] with the decoder's diagnostic.
pub fn decode_json(text: &str) -> Result<ConfigValue> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ConfigTemplateError::malformed("json", e))?;
    match value {
        serde_json::Value::Object(_) | serde_json::Value::Array(_) => Ok(ConfigValue::from(value)),
        other => Err(ConfigTemplateError::malformed(
            "json",
            format!("top-level value must be an object or an array, found {other}"),
        )),
    }
}

/// Encode as JSON with sorted keys and four-space indentation.
///
/// # Errors
///
/// [`ConfigTemplateError::Emit`] if serialization fails.
pub fn encode_json(value: &ConfigValue) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .to_json()
        .serialize(&mut serializer)
        .map_err(|e| ConfigTemplateError::emit("json", e))?;
    String::from_utf8(buf).map_err(|e| ConfigTemplateError::emit("json", e))
}

/// Decode a YAML document. The root must be a mapping or a sequence; an
/// empty document is an empty mapping.
///
/// # Errors
///
/// [`ConfigTemplateError::MalformedInput`] with the scanner's diagnostic.
pub fn decode_yaml(text: &str) -> Result<ConfigValue> {
    let yaml = config_template_yaml::load(text).map_err(|e| ConfigTemplateError::malformed("yaml", e))?;
    match yaml {
        Yaml::Null => Ok(ConfigValue::empty_section()),
        Yaml::Hash(_) | Yaml::Array(_) => from_yaml(yaml),
        _ => Err(ConfigTemplateError::malformed(
            "yaml",
            "top-level value must be a mapping or a sequence",
        )),
    }
}

/// Encode as block-style YAML with sorted keys.
///
/// # Errors
///
/// [`ConfigTemplateError::Emit`] if the emitter fails.
pub fn encode_yaml(value: &ConfigValue, multiline_strings: bool) -> Result<String> {
    config_template_yaml::emit(&to_yaml(value), multiline_strings)
        .map_err(|e| ConfigTemplateError::emit("yaml", e))
}

fn from_yaml(yaml: Yaml) -> Result<ConfigValue> {
    match yaml {
        Yaml::Hash(hash) => {
            let mut map = OrderedMultiMap::new();
            for (key, value) in hash {
                let key = yaml_key(&key).ok_or_else(|| {
                    ConfigTemplateError::malformed("yaml", "mapping keys must be scalars")
                })?;
                map.insert(key, from_yaml(value)?);
            }
            Ok(ConfigValue::Section(map))
        }
        Yaml::Array(items) => Ok(ConfigValue::List(
            items.into_iter().map(from_yaml).collect::<Result<_>>()?,
        )),
        other => Ok(ConfigValue::Scalar(scalar_from_yaml(other))),
    }
}

fn to_yaml(value: &ConfigValue) -> Yaml {
    match value {
        ConfigValue::Scalar(Scalar::Null) => Yaml::Null,
        ConfigValue::Scalar(Scalar::Bool(b)) => Yaml::Boolean(*b),
        ConfigValue::Scalar(Scalar::Integer(i)) => Yaml::Integer(*i),
        ConfigValue::Scalar(Scalar::Real(text)) => Yaml::Real(text.clone()),
        ConfigValue::Scalar(Scalar::String(s)) => Yaml::String(s.clone()),
        ConfigValue::List(items) => Yaml::Array(items.iter().map(to_yaml).collect()),
        ConfigValue::MultiSet(set) => {
            Yaml::Array(set.iter().map(|m| Yaml::String(m.to_string())).collect())
        }
        ConfigValue::Section(map) => {
            let mut pairs: Vec<(&str, &ConfigValue)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let mut hash = Hash::new();
            for (key, child) in pairs {
                hash.insert(Yaml::String(key.to_string()), to_yaml(child));
            }
            Yaml::Hash(hash)
        }
    }
}

/// The string a scalar YAML mapping key stands for.
pub(crate) fn yaml_key(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        Yaml::Null => Some("null".to_string()),
        _ => None,
    }
}

pub(crate) fn scalar_from_yaml(yaml: Yaml) -> Scalar {
    match yaml {
        Yaml::String(s) => Scalar::String(s),
        Yaml::Integer(i) => Scalar::Integer(i),
        Yaml::Real(s) => Scalar::Real(s),
        Yaml::Boolean(b) => Scalar::Bool(b),
        _ => Scalar::Null,
    }
}

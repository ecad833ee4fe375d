//! INI serialization.

use super::{DEFAULT_SECTION, IniDocument};
use crate::multimap::{Entry, OrderedMultiMap};
use crate::value::{ConfigValue, Scalar};

/// Serialize a document.
///
/// The default bucket comes first, bare unless the source had an explicit
/// `[DEFAULT]` header, and only if it holds more than blank lines. A custom default section
/// follows with its header, then every other section in discovery order. Each
/// block ends with exactly one blank line.
///
/// When `ignore_empty_values` is set, valueless directives and blank lines
/// are dropped. Comments are always kept.
pub fn write_document(doc: &IniDocument, ignore_empty_values: bool) -> String {
    let mut out = String::new();

    let has_defaults = doc
        .defaults()
        .entries()
        .iter()
        .any(|entry| !matches!(entry, Entry::Verbatim(line) if line.is_empty()));
    if has_defaults {
        let header = doc.has_explicit_default_header().then_some(DEFAULT_SECTION);
        write_block(&mut out, header, doc.defaults(), ignore_empty_values);
    }

    let custom_default = doc.default_section();
    if custom_default != DEFAULT_SECTION {
        if let Some(section) = doc.section(custom_default) {
            write_block(&mut out, Some(custom_default), section, ignore_empty_values);
        }
    }

    for (name, section) in doc.sections() {
        if name == custom_default {
            continue;
        }
        write_block(&mut out, Some(name), section, ignore_empty_values);
    }

    out
}

fn write_block(out: &mut String, header: Option<&str>, section: &OrderedMultiMap, ignore_empty_values: bool) {
    if let Some(name) = header {
        out.push_str(&format!("[{name}]\n"));
    }

    let entries = section.entries();
    let end = entries
        .iter()
        .rposition(|entry| !matches!(entry, Entry::Verbatim(line) if line.is_empty()))
        .map_or(0, |index| index + 1);

    for entry in &entries[..end] {
        write_entry(out, entry, ignore_empty_values);
    }
    out.push('\n');
}

fn write_entry(out: &mut String, entry: &Entry, ignore_empty_values: bool) {
    match entry {
        Entry::KeyValue { key, value } => write_value(out, key, value, ignore_empty_values),
        Entry::Valueless(key) => {
            if !ignore_empty_values {
                out.push_str(key);
                out.push('\n');
            }
        }
        Entry::Verbatim(line) => {
            if !line.is_empty() || !ignore_empty_values {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
}

fn write_value(out: &mut String, key: &str, value: &ConfigValue, ignore_empty_values: bool) {
    match value {
        ConfigValue::MultiSet(set) => {
            for member in set.sorted() {
                write_line(out, key, member);
            }
        }
        ConfigValue::Scalar(Scalar::Null) => {
            if !ignore_empty_values {
                out.push_str(key);
                out.push('\n');
            }
        }
        other => write_line(out, key, &other.to_string()),
    }
}

fn write_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(" = ");
    out.push_str(&value.replace('\n', "\n\t"));
    out.push('\n');
}

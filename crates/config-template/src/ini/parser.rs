//! Line-oriented INI parser.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DEFAULT_SECTION, IniDocument};
use crate::value::ConfigValue;

/// `[name]` at the start of a line.
static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<header>.+)\]").unwrap());

/// `key = value` or `key: value`. The key stops at the first separator.
static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<key>[^=:]*?)\s*[=:]\s*(?P<value>.*)$").unwrap());

/// How a single source line was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Header,
    Comment,
    Blank,
    Continuation,
    Option,
    Valueless,
}

/// Parse section/key-value text.
///
/// Lines are classified one at a time, in this order:
///
/// 1. `[name]` starts (or re-enters) a section; `[DEFAULT]` re-enters the
///    default bucket
/// 2. lines starting with `#` or `;` are kept verbatim as comments
/// 3. blank lines are kept verbatim
/// 4. `key = value` / `key: value` pairs, indented or not, are stored with
///    [`OrderedMultiMap::set`](crate::OrderedMultiMap::set), so repeated keys
///    coalesce
/// 5. indented lines without a separator following a string value continue
///    that value
/// 6. anything else is a valueless directive
///
/// Parsing never fails: every line lands somewhere.
pub fn parse_document(text: &str, default_section: &str) -> IniDocument {
    let mut doc = IniDocument::new(default_section);
    let mut current = DEFAULT_SECTION.to_string();

    for (number, line) in text.lines().enumerate() {
        let kind = classify(&mut doc, &mut current, line);
        tracing::trace!(line = number + 1, ?kind, section = %current, "Classified line");
    }

    doc
}

fn classify(doc: &mut IniDocument, current: &mut String, line: &str) -> LineKind {
    let trimmed = line.trim();

    if let Some(caps) = SECTION_HEADER.captures(trimmed) {
        let name = caps["header"].to_string();
        if name == DEFAULT_SECTION {
            doc.mark_explicit_default_header();
        }
        doc.ensure_section(&name);
        *current = name;
        return LineKind::Header;
    }

    let section = doc.ensure_section(current);

    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        section.push_verbatim(line.trim_end());
        return LineKind::Comment;
    }

    if trimmed.is_empty() {
        section.push_verbatim("");
        return LineKind::Blank;
    }

    if let Some(caps) = OPTION_LINE.captures(trimmed) {
        let key = caps["key"].trim();
        if !key.is_empty() {
            section.set(key, ConfigValue::string(clean_value(&caps["value"])));
            return LineKind::Option;
        }
    }

    let indented = line.starts_with(char::is_whitespace);
    if indented && section.append_continuation(trimmed) {
        return LineKind::Continuation;
    }

    section.push_valueless(trimmed);
    LineKind::Valueless
}

/// Strip an inline `;` comment (only when preceded by whitespace), trim, and
/// turn the quoted-empty token `""` into an empty string.
fn clean_value(raw: &str) -> String {
    let mut value = raw;
    let mut previous = None;
    for (index, ch) in raw.char_indices() {
        if ch == ';' && previous.is_some_and(char::is_whitespace) {
            value = &raw[..index];
            break;
        }
        previous = Some(ch);
    }

    match value.trim() {
        "\"\"" => String::new(),
        other => other.to_string(),
    }
}

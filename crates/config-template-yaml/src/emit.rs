//! Block-style YAML emission.

use crate::Result;
use yaml_rust2::{Yaml, YamlEmitter};

/// Emit a YAML tree as a block-style document.
///
/// Sequences nested under mapping keys are indented, lines are never folded,
/// and the document-start marker is left out. When `multiline_strings` is set,
/// strings containing newlines are written as literal blocks instead of
/// quoted escapes. The output always ends with a newline.
///
/// # Errors
///
/// Returns [`crate::Error::Emit`] if the emitter fails.
pub fn emit(yaml: &Yaml, multiline_strings: bool) -> Result<String> {
    let mut out = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut out);
        emitter.multiline_strings(multiline_strings);
        emitter.dump(yaml)?;
    }

    let body = out
        .strip_prefix("---\n")
        .or_else(|| out.strip_prefix("--- "))
        .or_else(|| out.strip_prefix("---"))
        .unwrap_or(&out);

    let mut rendered = body.to_string();
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

//! Override tag parsing.
//!
//! Tags on override values use underscore-separated components:
//! `!prefer`, `!concat`, `!split`, `!str`, or combinations such as
//! `!prefer_split`.

use crate::error::{ConfigTemplateError, Result};
use crate::overrides::MergeOp;

/// How a tagged string value should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueIntent {
    /// Split on commas and newlines into a list (`!split`).
    Split,
    /// Keep as one string, never split (`!str`).
    Literal,
}

/// Result of parsing a tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedTag {
    /// Merge operation (None means use `extend_lists`)
    pub merge_op: Option<MergeOp>,

    /// Value intent (None means plain value)
    pub intent: Option<ValueIntent>,
}

/// Parse a tag suffix (without the leading `!`).
///
/// # Errors
///
/// [`ConfigTemplateError::InvalidTag`] for invalid characters, empty
/// components, and conflicting merge operations or intents. Unknown
/// components are logged and skipped.
pub fn parse_tag(tag: &str) -> Result<ParsedTag> {
    let mut result = ParsedTag::default();

    if tag.contains(|c: char| !c.is_alphanumeric() && c != '_') {
        return Err(invalid(
            tag,
            "only letters, numbers, and underscores are allowed",
        ));
    }

    for component in tag.split('_') {
        match component {
            "" => {
                return Err(invalid(
                    tag,
                    "empty component (check for leading, trailing, or consecutive underscores)",
                ));
            }
            "prefer" | "concat" => {
                if result.merge_op.is_some() {
                    return Err(invalid(tag, "only one of 'prefer' or 'concat' is allowed"));
                }
                result.merge_op = Some(if component == "prefer" {
                    MergeOp::Prefer
                } else {
                    MergeOp::Concat
                });
            }
            "split" | "str" => {
                if result.intent.is_some() {
                    return Err(invalid(tag, "only one of 'split' or 'str' is allowed"));
                }
                result.intent = Some(if component == "split" {
                    ValueIntent::Split
                } else {
                    ValueIntent::Literal
                });
            }
            unknown => {
                tracing::warn!(
                    tag,
                    component = unknown,
                    "Ignoring unknown tag component; valid components are prefer, concat, split, str"
                );
            }
        }
    }

    Ok(result)
}

fn invalid(tag: &str, message: &str) -> ConfigTemplateError {
    ConfigTemplateError::InvalidTag {
        tag: tag.to_string(),
        message: message.to_string(),
    }
}

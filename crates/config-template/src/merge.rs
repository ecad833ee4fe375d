//! Recursive merge of override trees into JSON/YAML-shaped documents.
//!
//! One function, [`deep_merge`], decides every case by matching the base
//! value against the override node:
//!
//! | base          | override               | result                          |
//! |---------------|------------------------|---------------------------------|
//! | section       | map (not `!prefer`)    | key-wise recursive merge        |
//! | anything      | empty map              | unchanged                       |
//! | anything      | map                    | fresh section from the override |
//! | list          | `!concat_split` string | segments appended               |
//! | anything      | `!split` string        | list of trimmed segments        |
//! | anything      | `!str` string          | the string, unsplit             |
//! | anything      | plain string, legacy   | split if it holds `,` or `\n`   |
//! | list          | list, extending        | members appended                |
//! | set           | set, extending         | new members appended            |
//! | list          | set, extending         | members appended as strings     |
//! | anything else |                        | replaced by the override        |
//!
//! "Extending" is the node's [`MergeOp`] if it has one, else
//! [`MergeOptions::extend_lists`].

use crate::multimap::OrderedMultiMap;
use crate::options::{MergeOptions, SplitMode};
use crate::overrides::{MergeOp, OverrideKind, OverrideNode, split_list};
use crate::value::{ConfigValue, Scalar};

/// Merge `node` into `base`, returning the merged tree.
///
/// The override tree is only read, never modified.
pub fn deep_merge(base: ConfigValue, node: &OverrideNode, options: &MergeOptions) -> ConfigValue {
    merge_value(Some(base), node, options)
}

fn merge_value(base: Option<ConfigValue>, node: &OverrideNode, options: &MergeOptions) -> ConfigValue {
    let extend = match node.merge_op {
        Some(MergeOp::Prefer) => false,
        Some(MergeOp::Concat) => true,
        None => options.extend_lists,
    };

    match (base, &node.kind) {
        (Some(ConfigValue::Section(mut map)), OverrideKind::Map(overrides))
            if node.merge_op != Some(MergeOp::Prefer) =>
        {
            for (key, child) in overrides {
                merge_entry(&mut map, key, child, options);
            }
            ConfigValue::Section(map)
        }
        (Some(base), OverrideKind::Map(overrides))
            if overrides.is_empty() && node.merge_op != Some(MergeOp::Prefer) =>
        {
            base
        }
        (_, OverrideKind::Map(overrides)) => {
            let mut map = OrderedMultiMap::new();
            for (key, child) in overrides {
                merge_entry(&mut map, key, child, options);
            }
            ConfigValue::Section(map)
        }
        (Some(ConfigValue::List(mut items)), OverrideKind::Split(text))
            if node.merge_op == Some(MergeOp::Concat) =>
        {
            if let ConfigValue::List(more) = split_list(text) {
                items.extend(more);
            }
            ConfigValue::List(items)
        }
        (_, OverrideKind::Split(text)) => split_list(text),
        (_, OverrideKind::Literal(text)) => ConfigValue::string(text.clone()),
        (_, OverrideKind::Scalar(Scalar::String(text))) if splits_implicitly(text, options) => {
            split_list(text)
        }
        (Some(ConfigValue::List(mut items)), OverrideKind::List(more)) if extend => {
            items.extend(more.iter().map(OverrideNode::to_config_value));
            ConfigValue::List(items)
        }
        (Some(ConfigValue::MultiSet(mut set)), OverrideKind::MultiSet(more)) if extend => {
            set.extend(more.iter());
            ConfigValue::MultiSet(set)
        }
        (Some(ConfigValue::List(mut items)), OverrideKind::MultiSet(more)) if extend => {
            items.extend(more.iter().map(ConfigValue::string));
            ConfigValue::List(items)
        }
        (_, _) => node.to_config_value(),
    }
}

fn merge_entry(map: &mut OrderedMultiMap, key: &str, child: &OverrideNode, options: &MergeOptions) {
    tracing::trace!(key, merge_op = ?child.merge_op, "Merging override entry");
    if let Some(slot) = map.get_mut(key) {
        let current = std::mem::replace(slot, ConfigValue::null());
        *slot = merge_value(Some(current), child, options);
    } else {
        map.insert(key, merge_value(None, child, options));
    }
}

fn splits_implicitly(text: &str, options: &MergeOptions) -> bool {
    options.split_mode == SplitMode::Legacy
        && (text.contains(',') || (!options.preserve_multiline_strings && text.contains('\n')))
}

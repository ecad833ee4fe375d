//! Merge override values into configuration documents and diff the results.
//!
//! Three document shapes are supported: section/key-value text (INI), JSON
//! and YAML. A merge takes the document text and an [`OverrideSpec`] and
//! produces the serialized result plus a normalized [`ConfigValue`] tree.
//! Two normalized trees can then be compared with [`diff`].
//!
//! # Key Features
//!
//! - **Lossless INI editing**: repeated keys coalesce into [`MultiSet`]s,
//!   comments and blank lines keep their positions, and new default keys land
//!   next to their commented-out template line
//! - **Explicit merge intent**: `!prefer`, `!concat`, `!split` and `!str`
//!   YAML tags on override values say whether collections extend or replace
//!   and whether strings become lists
//! - **Deterministic output**: JSON and YAML are written with sorted keys,
//!   multi-value INI keys with sorted members
//!
//! # Architecture
//!
//! - [`ConfigValue`] / [`OrderedMultiMap`]: the format-independent tree
//! - [`IniDocument`]: the INI parser and writer
//! - [`deep_merge`]: the recursive merge for JSON/YAML trees
//! - [`merge_overrides`] / [`ConfigTemplate`]: format dispatch
//! - [`diff`] / [`DiffReport`]: structural comparison
//!
//! # Example
//!
//! ```rust
//! use config_template::{ConfigFormat, MergeOptions, OverrideSpec, diff, merge_overrides};
//! use serde_json::json;
//!
//! let document = "[mysqld]\nport = 3306\n";
//! let overrides = OverrideSpec::from_json(json!({"mysqld": {"port": 3307}}));
//! let output = merge_overrides(ConfigFormat::Ini, document, &overrides, &MergeOptions::default()).unwrap();
//! assert_eq!(output.rendered, "[mysqld]\nport = 3307\n\n");
//!
//! let before = merge_overrides(ConfigFormat::Ini, document, &OverrideSpec::empty(), &MergeOptions::default())
//!     .unwrap()
//!     .tree;
//! let (report, has_changes) = diff(&before, &output.tree);
//! assert!(has_changes);
//! assert_eq!(report.changed.to_json(), json!({"mysqld": {"port": {"current": "3306", "new": "3307"}}}));
//! ```

mod diff;
mod error;
mod ini;
mod merge;
mod multimap;
mod options;
mod overrides;
mod tag;
mod template;
mod tree;
mod value;

pub use diff::{DiffReport, diff};

pub use error::{ConfigTemplateError, Result};

pub use ini::{DEFAULT_SECTION, IniDocument, apply_overrides, parse_document, write_document};

pub use merge::deep_merge;

pub use multimap::{Entry, OrderedMultiMap};

pub use options::{ConfigFormat, MergeOptions, SplitMode};

pub use overrides::{MergeOp, OverrideKind, OverrideNode, OverrideSpec};

pub use tag::{ParsedTag, ValueIntent, parse_tag};

pub use template::{ChangePlan, ConfigTemplate, MergeOutput, merge_overrides};

pub use tree::{decode_json, decode_yaml, encode_json, encode_yaml};

pub use value::{ConfigValue, MultiSet, Scalar};

//! # config-template-yaml
//!
//! YAML plumbing for config-template.
//!
//! Two jobs live here:
//!
//! - **Tagged parsing**: [`parse_tagged`] builds a [`TaggedYaml`] tree in which
//!   every node remembers its local YAML tag (`!prefer`, `!split`, ...) and its
//!   position. Override specifications use those tags to state merge intent
//!   explicitly instead of having it guessed from the content of a value.
//! - **Documents**: [`load`] decodes a plain YAML document and [`emit`] writes
//!   a `Yaml` tree back out in block style.
//!
//! ## Example
//!
//! ```rust
//! use config_template_yaml::parse_tagged;
//!
//! let yaml = parse_tagged("servers: !concat [a, b]").unwrap();
//! let servers = yaml.get_hash_value("servers").unwrap();
//! assert_eq!(servers.tag.as_deref(), Some("concat"));
//! assert_eq!(servers.len(), 2);
//! ```

mod emit;
mod error;
mod parser;
mod tagged;

pub use emit::emit;
pub use error::{Error, Result};
pub use parser::{load, parse_tagged};
pub use tagged::{Position, TaggedEntry, TaggedYaml};

// Re-export so callers can build trees for `emit` without a direct dependency.
pub use yaml_rust2::Yaml;
pub use yaml_rust2::yaml::Hash;

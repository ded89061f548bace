//! `Wiringfile` manifest structures.
//!
//! A manifest declares nodes by naming the plugin that provides them, plus
//! aliases, extra properties and the roots to instantiate. The YAML is parsed
//! into JSON values first and then deserialised into these types, so property
//! values keep whatever shape the YAML gave them.
//!
//! ```rust
//! use wirespec::ast::{Plugin, StringOrList, WiringManifest};
//!
//! let json = serde_json::json!({
//!     "wiring_version": "1.0.0",
//!     "name": "leaf_app",
//!     "nodes": [
//!         { "name": "leaf_db", "plugin": "nosqldb" },
//!         { "name": "leaf", "plugin": "service", "type": "LeafService", "args": "leaf_db" }
//!     ]
//! });
//! let manifest: WiringManifest = serde_json::from_value(json).expect("parse");
//! assert_eq!(manifest.nodes[1].plugin, Plugin::Service);
//! assert_eq!(manifest.nodes[1].args, StringOrList::String("leaf_db".into()));
//! ```

use std::fmt;

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Top-level manifest parsed from a `Wiringfile`.
///
/// ```yaml
/// wiring_version: "1.0.0"
/// name: leaf_app
/// nodes:
///   - name: leaf_cache
///     plugin: cache
/// instantiate: leaf_cache
/// ```
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WiringManifest {
    /// Semantic version of the manifest format.
    pub wiring_version: Version,

    /// Application name.
    pub name: String,

    /// Node declarations in order.
    #[serde(default)]
    pub nodes: Vec<NodeDecl>,

    /// Alias name to target name.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,

    /// Extra properties attached to any name.
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,

    /// Roots built when none are given on the command line. Every declared
    /// node when empty.
    #[serde(default)]
    pub instantiate: StringOrList,
}

/// The plugin that provides a declared node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plugin {
    /// In-memory cache.
    Cache,
    /// In-memory document store.
    Nosqldb,
    /// Configuration value taken from `value`.
    Config,
    /// Application service of `type` built from `args`.
    Service,
    /// Go process hosting the nodes in `contains`.
    Process,
    /// Linux container hosting the processes in `contains`.
    Container,
}

impl Plugin {
    /// Manifest spelling of the plugin.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Nosqldb => "nosqldb",
            Self::Config => "config",
            Self::Service => "service",
            Self::Process => "process",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDecl {
    /// Node name.
    pub name: String,
    /// Providing plugin.
    pub plugin: Plugin,
    /// Service type; required by `service`.
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    /// Constructor arguments of a `service`.
    #[serde(default)]
    pub args: StringOrList,
    /// Children of a `process` or `container`.
    #[serde(default)]
    pub contains: StringOrList,
    /// Value of a `config` node.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// A property write applied after every node is declared.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDecl {
    /// Name the property is attached to.
    pub name: String,
    /// Property key.
    pub key: String,
    /// Stored value.
    pub value: serde_json::Value,
    /// Whether the value replaces or extends existing values.
    #[serde(default)]
    pub mode: PropertyMode,
}

/// How a [`PropertyDecl`] is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyMode {
    /// Replace existing values.
    #[default]
    Set,
    /// Append to existing values.
    Add,
}

/// A helper for fields that accept either a single string or a list of
/// strings.
///
/// Empty values deserialise to `StringOrList::Empty`.
///
/// ```yaml
/// # Scalar
/// args: leaf_db
/// # Sequence
/// args:
///   - leaf_cache
///   - leaf_db
/// ```
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single string item.
    String(String),
    /// A list of string items.
    List(Vec<String>),
}

impl StringOrList {
    /// Whether no item is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(_) => false,
            Self::List(items) => items.is_empty(),
        }
    }

    /// Items in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::String(item) => vec![item.clone()],
            Self::List(items) => items.clone(),
        }
    }
}

//! Named build recipes.

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;

use super::WiringError;
use super::property::{Properties, display_value};
use crate::ir::{NodeKind, NodeRef};
use crate::namespace::Namespace;

/// Builds a node inside the namespace it is given.
///
/// The function may call [`Namespace::get`] any number of times to resolve
/// its dependencies before constructing its own node.
pub type BuildFn = Arc<dyn Fn(&mut Namespace<'_, '_>) -> Result<NodeRef, WiringError> + Send + Sync>;

/// Options that fine-tune how a definition is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WiringOpts {
    /// Category the build function returns. Defaults to the declared kind.
    pub return_kind: Option<NodeKind>,
    /// The build function returns a node built elsewhere, so the result is
    /// not recorded as a node or edge of the namespace.
    pub proxy: bool,
}

impl WiringOpts {
    /// Options for a proxy definition.
    #[must_use]
    pub const fn proxy() -> Self {
        Self {
            return_kind: None,
            proxy: true,
        }
    }
}

/// A named build recipe together with its properties.
///
/// Definitions created implicitly by a property write have no kind and no
/// build function until `define` is called for them.
#[derive(Clone, Default)]
pub struct WiringDef {
    name: String,
    node_kind: Option<NodeKind>,
    build: Option<BuildFn>,
    options: WiringOpts,
    /// Static metadata attached to the definition.
    pub properties: Properties,
}

impl WiringDef {
    pub(crate) fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    pub(crate) fn redefine(&mut self, kind: NodeKind, build: BuildFn, options: WiringOpts) {
        self.node_kind = Some(kind);
        self.build = Some(build);
        self.options = WiringOpts {
            return_kind: options.return_kind.or(Some(kind)),
            ..options
        };
    }

    /// Definition name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared node category, if the definition has been defined.
    #[must_use]
    pub const fn node_kind(&self) -> Option<NodeKind> {
        self.node_kind
    }

    /// Build options.
    #[must_use]
    pub const fn options(&self) -> WiringOpts {
        self.options
    }

    /// The build function, if the definition has been defined.
    #[must_use]
    pub fn build_fn(&self) -> Option<&BuildFn> {
        self.build.as_ref()
    }

    /// Whether `define` has been called for this name.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.build.is_some()
    }
}

impl Debug for WiringDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WiringDef")
            .field("name", &self.name)
            .field("node_kind", &self.node_kind)
            .field("defined", &self.build.is_some())
            .field("options", &self.options)
            .field("properties", &self.properties)
            .finish()
    }
}

impl Display for WiringDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = self
            .node_kind
            .map_or_else(|| "Undefined".to_owned(), |k| k.to_string());
        let props = self
            .properties
            .visible()
            .map(|(key, values)| format!("{key}={}", values.iter().map(display_value).join(",")))
            .join(", ");
        write!(f, "{} = {kind}({props})", self.name)
    }
}

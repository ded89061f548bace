//! Turning a wiring spec into an [`ApplicationGraph`].
//!
//! [`WiringSpec::build_ir`] opens the global namespace, instantiates every
//! requested root, runs deferred actions and packages what the global
//! namespace owns. Any error aborts the call; there is no partial graph.
//!
//! [`DefaultBuilders`] is the registry deployment targets use to wrap nodes
//! left floating at the top level, such as components that no process claims.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::ir::{ApplicationGraph, NodeKind, NodeRef};
use crate::namespace::{NamespaceKind, Resolver};
use crate::wiring::{WiringError, WiringSpec};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs for a single resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of builds in progress at once.
    pub max_depth: usize,
    /// Reject build functions that return a node of another kind than
    /// their definition declares.
    pub check_node_kinds: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            check_node_kinds: true,
        }
    }
}

impl WiringSpec {
    /// Build the named roots and everything they depend on.
    ///
    /// # Errors
    ///
    /// Returns the first [`WiringError`] raised while resolving any root or
    /// running a deferred action.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirespec::plugins::simple;
    /// use wirespec::wiring::WiringSpec;
    ///
    /// let mut spec = WiringSpec::new("app");
    /// simple::cache(&mut spec, "sessions");
    /// let graph = spec.build_ir(&["sessions"]).expect("build");
    /// assert_eq!(graph.to_string(), "app = Application() {\n  sessions = SimpleCache()\n}");
    /// ```
    pub fn build_ir<S: AsRef<str>>(&self, roots: &[S]) -> Result<ApplicationGraph, WiringError> {
        self.build_ir_with(roots, ResolveOptions::default())
    }

    /// [`WiringSpec::build_ir`] with explicit [`ResolveOptions`].
    ///
    /// # Errors
    ///
    /// As for [`WiringSpec::build_ir`].
    pub fn build_ir_with<S: AsRef<str>>(
        &self,
        roots: &[S],
        options: ResolveOptions,
    ) -> Result<ApplicationGraph, WiringError> {
        info!(app = self.name(), roots = roots.len(), "building IR");
        let mut resolver = Resolver::new(self, options);
        let global = resolver.push_scope(self.name().to_owned(), NamespaceKind::Global, None);
        let mut ns = resolver.namespace(global);
        for root in roots {
            ns.instantiate(root.as_ref())?;
        }
        resolver.run_deferred()?;
        let (contents, dependencies) = resolver.finish(global);
        let graph = ApplicationGraph::new(self.name().to_owned(), contents.nodes, dependencies);
        info!(
            app = self.name(),
            nodes = graph.nodes().len(),
            dependencies = graph.dependencies().len(),
            "built IR"
        );
        Ok(graph)
    }
}

/// Wraps the floating nodes of one kind into a single node.
///
/// Receives the application name and the nodes to wrap.
pub type DefaultBuilderFn =
    Arc<dyn Fn(&str, Vec<NodeRef>) -> Result<NodeRef, WiringError> + Send + Sync>;

/// Default wrapper per node kind, applied in registration order.
#[derive(Clone, Default)]
pub struct DefaultBuilders {
    builders: IndexMap<NodeKind, DefaultBuilderFn>,
}

impl DefaultBuilders {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry the bundled plugins provide: floating components go
    /// into a default process, floating processes into a default container.
    #[must_use]
    pub fn standard() -> Self {
        let mut builders = Self::new();
        crate::plugins::register_default_builders(&mut builders);
        builders
    }

    /// Register `build` as the wrapper for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: NodeKind, build: F)
    where
        F: Fn(&str, Vec<NodeRef>) -> Result<NodeRef, WiringError> + Send + Sync + 'static,
    {
        if self.builders.insert(kind, Arc::new(build)).is_some() {
            debug!(%kind, "replaced default builder");
        }
    }

    /// Whether a wrapper is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: NodeKind) -> bool {
        self.builders.contains_key(&kind)
    }

    /// Wrap the top-level nodes of `graph`.
    ///
    /// Each registered kind in turn collects the current nodes of that kind,
    /// including wrappers produced by earlier kinds, and replaces them with
    /// one wrapper appended after the untouched nodes.
    ///
    /// # Errors
    ///
    /// Returns the first error a wrapper reports.
    pub fn apply(&self, graph: &ApplicationGraph) -> Result<Vec<NodeRef>, WiringError> {
        let mut nodes = graph.nodes().to_vec();
        for (kind, build) in &self.builders {
            let (floating, rest): (Vec<_>, Vec<_>) =
                nodes.into_iter().partition(|node| node.kind() == *kind);
            nodes = rest;
            if floating.is_empty() {
                continue;
            }
            debug!(%kind, count = floating.len(), "wrapping floating nodes");
            nodes.push(build(graph.name(), floating)?);
        }
        Ok(nodes)
    }
}

impl Debug for DefaultBuilders {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.builders.keys()).finish()
    }
}

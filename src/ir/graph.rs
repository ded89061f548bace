//! The resolved application graph returned by `build_ir`.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::{NodeKind, NodeRef, render_namespace};

/// A build-time dependency: `from` requested `to` while it was being built.
///
/// Both ends are canonical definition names (aliases already resolved).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    /// The definition whose build function issued the request.
    pub from: String,
    /// The definition that was requested.
    pub to: String,
}

impl Dependency {
    /// Create a dependency edge.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The IR of an application: every node reachable from the requested roots
/// plus the dependency edges observed while building them.
///
/// Built once per `build_ir` call and immutable afterwards.
#[derive(Clone, Debug)]
pub struct ApplicationGraph {
    name: String,
    nodes: Vec<NodeRef>,
    dependencies: Vec<Dependency>,
}

impl ApplicationGraph {
    pub(crate) const fn new(name: String, nodes: Vec<NodeRef>, dependencies: Vec<Dependency>) -> Self {
        Self {
            name,
            nodes,
            dependencies,
        }
    }

    /// Name of the application.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level nodes in the order their builds completed.
    #[must_use]
    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    /// Dependency edges in first-seen order.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Find a top-level node by its instance name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeRef> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    /// Names of the definitions `name` depends on directly.
    pub fn dependencies_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependencies
            .iter()
            .filter(move |dep| dep.from == name)
            .map(|dep| dep.to.as_str())
    }

    /// Serialisable summary of the graph.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            name: self.name.clone(),
            nodes: self.nodes.iter().map(NodeSummary::from_node).collect(),
            dependencies: self.dependencies.clone(),
        }
    }
}

impl Display for ApplicationGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&render_namespace(&self.name, "Application", &[], &self.nodes))
    }
}

/// JSON-friendly view of an [`ApplicationGraph`].
#[derive(Clone, Debug, Serialize)]
pub struct GraphSummary {
    /// Application name.
    pub name: String,
    /// Top-level nodes.
    pub nodes: Vec<NodeSummary>,
    /// Dependency edges.
    pub dependencies: Vec<Dependency>,
}

/// JSON-friendly view of a node and, for namespace nodes, its contents.
#[derive(Clone, Debug, Serialize)]
pub struct NodeSummary {
    /// Instance name.
    pub name: String,
    /// Node category.
    pub kind: NodeKind,
    /// Names of borrowed nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<String>,
    /// Owned child nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSummary>,
}

impl NodeSummary {
    fn from_node(node: &NodeRef) -> Self {
        let (edges, children) = node.contents().map_or_else(
            || (Vec::new(), Vec::new()),
            |contents| {
                (
                    contents.edges.iter().map(|e| e.name().to_owned()).collect(),
                    contents.nodes.iter().map(Self::from_node).collect(),
                )
            },
        );
        Self {
            name: node.name().to_owned(),
            kind: node.kind(),
            edges,
            children,
        }
    }
}

//! Go processes hosting application components.
//!
//! A process is built by opening a child [`NamespaceKind::Process`] scope and
//! instantiating its children there. Components the children need are built
//! inside the process; anything else (configuration, other processes) is
//! escalated to the enclosing scope and shows up as an argument of the
//! process.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::builder::DefaultBuilders;
use crate::ir::{IrNode, NodeKind, NodeRef, ScopeContents, render_namespace};
use crate::namespace::{Namespace, NamespaceKind};
use crate::wiring::WiringSpec;

/// Property listing the children of a process.
pub const CONTAINS_KEY: &str = "contains";

/// A runnable Go process and the components it instantiates.
#[derive(Debug)]
pub struct ProcessNode {
    name: String,
    contents: ScopeContents,
}

impl ProcessNode {
    /// Wrap already built nodes into a process.
    #[must_use]
    pub const fn new(name: String, contents: ScopeContents) -> Self {
        Self { name, contents }
    }
}

impl Display for ProcessNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&render_namespace(
            &self.name,
            "GoProcess",
            &self.contents.edges,
            &self.contents.nodes,
        ))
    }
}

impl IrNode for ProcessNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Process
    }

    fn contents(&self) -> Option<&ScopeContents> {
        Some(&self.contents)
    }
}

/// Declare the process `name` instantiating `children`.
///
/// Children are stored under the `contains` property and read when the
/// process is built, so [`add_child`] may extend the list afterwards.
#[track_caller]
pub fn create_process<S: AsRef<str>>(spec: &mut WiringSpec, name: &str, children: &[S]) -> String {
    if children.is_empty() {
        spec.add_error(format!("process `{name}` contains no nodes"));
    }
    for child in children {
        add_child(spec, name, child.as_ref());
    }
    let proc_name = name.to_owned();
    spec.define(name, NodeKind::Process, move |ns: &mut Namespace<'_, '_>| {
        let mut children: Vec<String> = Vec::new();
        ns.properties(&proc_name, CONTAINS_KEY, &mut children)?;
        let mut scope = ns.child(&proc_name, NamespaceKind::Process);
        for child in &children {
            scope.instantiate(child)?;
        }
        Ok(Arc::new(ProcessNode::new(proc_name.clone(), scope.into_contents())) as NodeRef)
    });
    name.to_owned()
}

/// Add `child` to the process `name`.
pub fn add_child(spec: &mut WiringSpec, name: &str, child: &str) {
    spec.add_property(name, CONTAINS_KEY, child);
}

/// Floating components end up in a default process named `{app}_proc`.
pub fn register_default_builders(builders: &mut DefaultBuilders) {
    builders.register(NodeKind::Component, |app: &str, nodes: Vec<NodeRef>| {
        let contents = ScopeContents {
            nodes,
            edges: Vec::new(),
        };
        Ok(Arc::new(ProcessNode::new(format!("{app}_proc"), contents)) as NodeRef)
    });
}

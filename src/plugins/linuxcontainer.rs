//! Linux containers hosting processes.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::builder::DefaultBuilders;
use crate::ir::{IrNode, NodeKind, NodeRef, ScopeContents, render_namespace};
use crate::namespace::{Namespace, NamespaceKind};
use crate::wiring::WiringSpec;

pub use super::goproc::CONTAINS_KEY;

/// A container image running one or more processes.
#[derive(Debug)]
pub struct ContainerNode {
    name: String,
    contents: ScopeContents,
}

impl ContainerNode {
    /// Wrap already built processes into a container.
    #[must_use]
    pub const fn new(name: String, contents: ScopeContents) -> Self {
        Self { name, contents }
    }
}

impl Display for ContainerNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&render_namespace(
            &self.name,
            "LinuxContainer",
            &self.contents.edges,
            &self.contents.nodes,
        ))
    }
}

impl IrNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Container
    }

    fn contents(&self) -> Option<&ScopeContents> {
        Some(&self.contents)
    }
}

/// Declare the container `name` running the processes in `children`.
#[track_caller]
pub fn create_container<S: AsRef<str>>(spec: &mut WiringSpec, name: &str, children: &[S]) -> String {
    if children.is_empty() {
        spec.add_error(format!("container `{name}` contains no processes"));
    }
    for child in children {
        spec.add_property(name, CONTAINS_KEY, child.as_ref());
    }
    let ctr_name = name.to_owned();
    spec.define(name, NodeKind::Container, move |ns: &mut Namespace<'_, '_>| {
        let mut children: Vec<String> = Vec::new();
        ns.properties(&ctr_name, CONTAINS_KEY, &mut children)?;
        let mut scope = ns.child(&ctr_name, NamespaceKind::Container);
        for child in &children {
            scope.instantiate(child)?;
        }
        Ok(Arc::new(ContainerNode::new(ctr_name.clone(), scope.into_contents())) as NodeRef)
    });
    name.to_owned()
}

/// Floating processes end up in a default container named `{app}_container`.
pub fn register_default_builders(builders: &mut DefaultBuilders) {
    builders.register(NodeKind::Process, |app: &str, nodes: Vec<NodeRef>| {
        let contents = ScopeContents {
            nodes,
            edges: Vec::new(),
        };
        Ok(Arc::new(ContainerNode::new(format!("{app}_container"), contents)) as NodeRef)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{goproc, simple};

    #[test]
    fn container_nests_process_and_components() {
        let mut spec = WiringSpec::new("app");
        simple::cache(&mut spec, "c");
        goproc::create_process(&mut spec, "p", &["c"]);
        create_container(&mut spec, "ctr", &["p"]);
        let graph = spec.build_ir(&["ctr"]).expect("build");
        assert_eq!(
            graph.to_string(),
            "app = Application() {\n  ctr = LinuxContainer() {\n    p = GoProcess() {\n      c = SimpleCache()\n    }\n  }\n}"
        );
    }

    #[test]
    fn empty_container_is_a_configuration_error() {
        let mut spec = WiringSpec::new("app");
        create_container::<&str>(&mut spec, "ctr", &[]);
        assert!(spec.err().is_err());
    }
}

//! Generic nodes and counting build functions.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wirespec::ir::{IrNode, NodeKind, NodeRef};
use wirespec::namespace::Namespace;
use wirespec::plugins::{simple, workflow};
use wirespec::wiring::{WiringError, WiringSpec};

/// A node that remembers the dependencies its build function resolved.
#[derive(Debug)]
pub struct TestNode {
    /// Instance name.
    pub name: String,
    /// Reported category.
    pub kind: NodeKind,
    /// Resolved dependencies in request order.
    pub deps: Vec<NodeRef>,
}

impl Display for TestNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let deps: Vec<&str> = self.deps.iter().map(|dep| dep.name()).collect();
        write!(f, "{} = TestNode({})", self.name, deps.join(", "))
    }
}

impl IrNode for TestNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }
}

/// Define `name` as a component that resolves `deps` and counts its builds.
///
/// Returns the build counter.
pub fn define_counting(spec: &mut WiringSpec, name: &str, deps: &[&str]) -> Arc<AtomicUsize> {
    define_counting_kind(spec, name, NodeKind::Component, deps)
}

/// [`define_counting`] with an explicit declared and returned kind.
pub fn define_counting_kind(
    spec: &mut WiringSpec,
    name: &str,
    kind: NodeKind,
    deps: &[&str],
) -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&counter);
    let node_name = name.to_owned();
    let deps: Vec<String> = deps.iter().map(|dep| (*dep).to_owned()).collect();
    spec.define(name, kind, move |ns: &mut Namespace<'_, '_>| {
        calls.fetch_add(1, Ordering::SeqCst);
        let resolved = deps
            .iter()
            .map(|dep| ns.get(dep))
            .collect::<Result<Vec<_>, WiringError>>()?;
        Ok(Arc::new(TestNode {
            name: node_name.clone(),
            kind,
            deps: resolved,
        }) as NodeRef)
    });
    counter
}

/// The leaf application: two backends, a service using both and a service
/// using the first service.
pub fn leaf_spec() -> WiringSpec {
    let mut spec = WiringSpec::new("leaf_app");
    simple::cache(&mut spec, "leaf_cache");
    simple::nosqldb(&mut spec, "leaf_db");
    workflow::service(&mut spec, "leaf", "LeafService", &["leaf_cache", "leaf_db"]);
    workflow::service(&mut spec, "nonleaf", "NonLeafService", &["leaf"]);
    spec
}

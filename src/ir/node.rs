//! The contract every IR node satisfies.

use std::any::Any;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use serde::Serialize;

/// Shared handle to a built node.
///
/// A namespace owns the handle it built; every dependant holds a clone of
/// the same `Arc`, so two lookups of one name observe the identical node.
pub type NodeRef = Arc<dyn IrNode>;

/// Category of an IR node.
///
/// Categories decide where a node gets built: a namespace accepts some
/// categories and escalates the rest to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// An in-process code component such as a service, cache or client.
    Component,
    /// A runnable process that hosts components.
    Process,
    /// A container that hosts processes.
    Container,
    /// A configuration value such as an address or port.
    Config,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Component => "Component",
            Self::Process => "Process",
            Self::Container => "Container",
            Self::Config => "Config",
        };
        f.write_str(label)
    }
}

/// Conversion of a shared node into a shared `Any` for downcasting.
pub trait AsAny: Any + Send + Sync {
    /// Convert the handle without changing the pointee.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A materialised node in the application graph.
///
/// `Display` renders the node for debugging; nodes that own a nested
/// namespace render a multi-line block and expose it via [`IrNode::contents`].
pub trait IrNode: AsAny + Debug + Display {
    /// Instance name of the node.
    fn name(&self) -> &str;

    /// Category the node belongs to.
    fn kind(&self) -> NodeKind;

    /// Nodes and edges of the namespace this node wraps, if any.
    fn contents(&self) -> Option<&ScopeContents> {
        None
    }
}

/// Nodes owned by a namespace and the edges it borrowed from its ancestors.
#[derive(Clone, Debug, Default)]
pub struct ScopeContents {
    /// Nodes built inside the namespace, in completion order.
    pub nodes: Vec<NodeRef>,
    /// Nodes used by the namespace but built by an ancestor.
    pub edges: Vec<NodeRef>,
}

impl ScopeContents {
    /// Whether the namespace neither owns nor borrows any node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Downcast a shared node to its concrete type.
///
/// Returns the original handle when the node is of a different type.
///
/// # Errors
///
/// Returns the untouched [`NodeRef`] if `node` is not a `T`.
pub fn downcast<T: IrNode>(node: NodeRef) -> Result<Arc<T>, NodeRef> {
    <dyn IrNode as AsAny>::into_any_arc(Arc::clone(&node))
        .downcast::<T>()
        .map_err(|_| node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Leaf(&'static str);

    impl Display for Leaf {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "{} = Leaf()", self.0)
        }
    }

    impl IrNode for Leaf {
        fn name(&self) -> &str {
            self.0
        }

        fn kind(&self) -> NodeKind {
            NodeKind::Component
        }
    }

    #[derive(Debug)]
    struct Other;

    impl Display for Other {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("other = Other()")
        }
    }

    impl IrNode for Other {
        fn name(&self) -> &str {
            "other"
        }

        fn kind(&self) -> NodeKind {
            NodeKind::Config
        }
    }

    #[test]
    fn downcast_recovers_concrete_type() {
        let node: NodeRef = Arc::new(Leaf("a"));
        let leaf = downcast::<Leaf>(Arc::clone(&node)).expect("leaf");
        assert_eq!(leaf.0, "a");
    }

    #[test]
    fn downcast_returns_original_on_mismatch() {
        let node: NodeRef = Arc::new(Other);
        let back = downcast::<Leaf>(Arc::clone(&node)).expect_err("mismatch");
        assert!(Arc::ptr_eq(&back, &node));
    }

    #[test]
    fn node_kind_displays_capitalised() {
        assert_eq!(NodeKind::Container.to_string(), "Container");
    }
}

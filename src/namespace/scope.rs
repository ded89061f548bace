//! Per-scope state: accepted node kinds, build states and owned contents.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::ir::{NodeKind, NodeRef, ScopeContents};

/// The closed set of namespace flavours and the node kinds each one builds.
///
/// # Examples
///
/// ```
/// use wirespec::ir::NodeKind;
/// use wirespec::namespace::NamespaceKind;
///
/// assert!(NamespaceKind::Global.accepts(NodeKind::Container));
/// assert!(NamespaceKind::Process.accepts(NodeKind::Component));
/// assert!(!NamespaceKind::Process.accepts(NodeKind::Config));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// The application root; builds every kind of node.
    Global,
    /// A process boundary; builds the components it hosts.
    Process,
    /// A container boundary; builds the processes it hosts.
    Container,
}

impl NamespaceKind {
    /// Whether nodes of `kind` are built inside namespaces of this flavour.
    #[must_use]
    pub const fn accepts(self, kind: NodeKind) -> bool {
        match self {
            Self::Global => true,
            Self::Process => matches!(kind, NodeKind::Component),
            Self::Container => matches!(kind, NodeKind::Process),
        }
    }
}

impl Display for NamespaceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Global => "global",
            Self::Process => "process",
            Self::Container => "container",
        };
        f.write_str(label)
    }
}

/// Index of a scope in the resolver's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScopeId(pub(crate) usize);

/// Lifecycle of a name within one scope. Absent means unseen.
#[derive(Clone, Debug)]
pub(crate) enum BuildState {
    Building,
    Built(NodeRef),
    Failed,
}

#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) name: String,
    pub(crate) kind: NamespaceKind,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) states: HashMap<String, BuildState>,
    pub(crate) contents: ScopeContents,
}

impl Scope {
    pub(crate) fn new(name: String, kind: NamespaceKind, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            kind,
            parent,
            states: HashMap::new(),
            contents: ScopeContents::default(),
        }
    }

    pub(crate) fn state(&self, name: &str) -> Option<&BuildState> {
        self.states.get(name)
    }

    /// The parent to hand `kind` to, if this scope does not build it itself.
    pub(crate) fn escalation_target(&self, kind: Option<NodeKind>) -> Option<ScopeId> {
        match kind {
            Some(kind) if !self.kind.accepts(kind) => self.parent,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NamespaceKind::Global, NodeKind::Component, true)]
    #[case(NamespaceKind::Global, NodeKind::Config, true)]
    #[case(NamespaceKind::Process, NodeKind::Component, true)]
    #[case(NamespaceKind::Process, NodeKind::Process, false)]
    #[case(NamespaceKind::Container, NodeKind::Process, true)]
    #[case(NamespaceKind::Container, NodeKind::Component, false)]
    fn accepts_matches_flavour(
        #[case] namespace: NamespaceKind,
        #[case] node: NodeKind,
        #[case] expected: bool,
    ) {
        assert_eq!(namespace.accepts(node), expected);
    }

    #[test]
    fn root_scope_never_escalates() {
        let scope = Scope::new("app".into(), NamespaceKind::Process, None);
        assert_eq!(scope.escalation_target(Some(NodeKind::Config)), None);
    }

    #[test]
    fn child_scope_escalates_rejected_kinds() {
        let scope = Scope::new("proc".into(), NamespaceKind::Process, Some(ScopeId(0)));
        assert_eq!(scope.escalation_target(Some(NodeKind::Config)), Some(ScopeId(0)));
        assert_eq!(scope.escalation_target(Some(NodeKind::Component)), None);
    }
}

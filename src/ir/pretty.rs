//! Text rendering helpers shared by nodes, namespaces and the wiring spec.

use itertools::Itertools;

use super::NodeRef;

/// Indent every non-empty line of `text` by `amount` spaces.
///
/// # Examples
///
/// ```
/// use wirespec::ir::indent;
///
/// assert_eq!(indent("a\n\nb", 2), "  a\n\n  b");
/// ```
#[must_use]
pub fn indent(text: &str, amount: usize) -> String {
    let pad = " ".repeat(amount);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .join("\n")
}

/// Render a namespace-like node as a nested block.
///
/// The header lists the names of the borrowed `edges`; each owned node is
/// rendered on its own indented line(s).
///
/// ```text
/// name = Type(edge_a, edge_b) {
///   child_a = ...
///   child_b = ...
/// }
/// ```
#[must_use]
pub fn render_namespace(name: &str, type_name: &str, edges: &[NodeRef], nodes: &[NodeRef]) -> String {
    let args = edges.iter().map(|edge| edge.name()).join(", ");
    let mut out = format!("{name} = {type_name}({args}) {{\n");
    let body = nodes.iter().map(ToString::to_string).join("\n");
    if !body.is_empty() {
        out.push_str(&indent(&body, 2));
        out.push('\n');
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrNode, NodeKind};
    use rstest::rstest;
    use std::fmt::{self, Display, Formatter};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Display for Named {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "{} = Named()", self.0)
        }
    }

    impl IrNode for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn kind(&self) -> NodeKind {
            NodeKind::Component
        }
    }

    #[rstest]
    #[case("", 2, "")]
    #[case("a", 0, "a")]
    #[case("a\nb", 4, "    a\n    b")]
    #[case("a\n\nb", 2, "  a\n\n  b")]
    fn indent_pads_non_empty_lines(#[case] text: &str, #[case] amount: usize, #[case] expected: &str) {
        assert_eq!(indent(text, amount), expected);
    }

    #[test]
    fn render_namespace_lists_edges_and_children() {
        let edges: Vec<NodeRef> = vec![Arc::new(Named("cfg"))];
        let nodes: Vec<NodeRef> = vec![Arc::new(Named("a")), Arc::new(Named("b"))];
        let text = render_namespace("proc", "Process", &edges, &nodes);
        assert_eq!(text, "proc = Process(cfg) {\n  a = Named()\n  b = Named()\n}");
    }

    #[test]
    fn render_namespace_handles_empty_body() {
        assert_eq!(render_namespace("p", "Process", &[], &[]), "p = Process() {\n}");
    }
}

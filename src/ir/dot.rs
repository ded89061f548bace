//! Graphviz rendering of the dependency edges.

use std::collections::BTreeSet;

use super::ApplicationGraph;

/// Render the graph's dependency edges in DOT format.
///
/// Node statements are sorted so the output is stable across runs.
#[must_use]
pub fn to_dot(graph: &ApplicationGraph) -> String {
    let mut names = BTreeSet::new();
    for dep in graph.dependencies() {
        names.insert(dep.from.as_str());
        names.insert(dep.to.as_str());
    }
    for node in graph.nodes() {
        names.insert(node.name());
    }

    let mut out = format!("digraph {} {{\n", quote(graph.name()));
    for name in names {
        out.push_str(&format!("  {};\n", quote(name)));
    }
    for dep in graph.dependencies() {
        out.push_str(&format!("  {} -> {};\n", quote(&dep.from), quote(&dep.to)));
    }
    out.push('}');
    out.push('\n');
    out
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Dependency;

    #[test]
    fn dot_lists_sorted_nodes_then_edges() {
        let graph = ApplicationGraph::new(
            "app".into(),
            Vec::new(),
            vec![Dependency::new("b", "a"), Dependency::new("c", "b")],
        );
        assert_eq!(
            to_dot(&graph),
            "digraph \"app\" {\n  \"a\";\n  \"b\";\n  \"c\";\n  \"b\" -> \"a\";\n  \"c\" -> \"b\";\n}\n"
        );
    }

    #[test]
    fn quote_escapes_embedded_quotes() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}

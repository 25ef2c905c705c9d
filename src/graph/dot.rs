//! Graphviz DOT export.

use std::fmt::Write;

use super::Graph;

/// Name of the emitted digraph.
pub const GRAPH_NAME: &str = "G";

/// Quote and escape a DOT identifier.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Render the graph as a `digraph` document.
///
/// Nodes come first, then edges, each in sorted order.
pub fn render(graph: &Graph) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "digraph {} {{", GRAPH_NAME);

    for (label, attrs) in graph.nodes() {
        if attrs.is_empty() {
            let _ = writeln!(out, "\t{};", quote(label));
        } else {
            let attrs = attrs
                .iter()
                .map(|(k, v)| format!("{}={}", k, quote(v)))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "\t{} [{}];", quote(label), attrs);
        }
    }

    for (from, to) in graph.edges() {
        let _ = writeln!(out, "\t{} -> {};", quote(from), quote(to));
    }

    out.push_str("}\n");
    out
}

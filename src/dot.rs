//! Minimal Graphviz DOT dumper.
//!
//! Ambient convenience, not part of the algorithmic core: a small stand-in
//! for `Cudd_DumpDot`, covering enough to visualize the small diagrams this
//! crate's demos and CLI build. No layout hints, no variable name lookup
//! beyond `x<var>` — a production dumper would take a name table.

use std::fmt::Write as _;

use crate::edge::Edge;
use crate::manager::Manager;

/// Renders the diagrams reachable from `roots` as a single Graphviz DOT
/// graph, one root per `(label, edge)` pair. Shared subgraphs are emitted
/// once; the root edges are drawn as labeled entry arrows, dashed when
/// complemented (following CUDD's convention for a complemented root).
pub fn dump_dot(manager: &Manager, roots: &[(&str, Edge)]) -> String {
    let mut out = String::new();
    writeln!(out, "digraph ternary_robdd {{").unwrap();
    writeln!(out, "  node [shape=circle];").unwrap();

    writeln!(out, "  one [shape=box, label=\"1\"];").unwrap();
    writeln!(out, "  unknown [shape=box, label=\"U\"];").unwrap();

    let mut visited = std::collections::HashSet::new();
    for &(_, root) in roots {
        visit(manager, root.regular(), &mut visited, &mut out);
    }

    for (i, &(label, root)) in roots.iter().enumerate() {
        let style = if root.is_complemented() { "style=dashed" } else { "style=solid" };
        writeln!(
            out,
            "  entry{i} [shape=plaintext, label=\"{label}\"];",
        )
        .unwrap();
        writeln!(out, "  entry{i} -> {} [{style}];", node_name(manager, root.regular())).unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}

fn node_name(manager: &Manager, regular: Edge) -> String {
    debug_assert!(!regular.is_complemented());
    if regular.is_one() {
        "one".to_string()
    } else if regular.is_unknown() {
        "unknown".to_string()
    } else {
        format!("n{}", regular.node())
    }
}

fn visit(manager: &Manager, regular: Edge, visited: &mut std::collections::HashSet<Edge>, out: &mut String) {
    if regular.is_constant() || !visited.insert(regular) {
        return;
    }
    let var = manager.var_of(regular);
    let then_edge = manager.raw_then(regular);
    let else_edge = manager.raw_else(regular);

    writeln!(out, "  {} [label=\"x{}\"];", node_name(manager, regular), var).unwrap();

    let then_style = "style=solid";
    writeln!(
        out,
        "  {} -> {} [{then_style}];",
        node_name(manager, regular),
        node_name(manager, then_edge.regular())
    )
    .unwrap();
    visit(manager, then_edge.regular(), visited, out);

    let else_style = if else_edge.is_complemented() { "style=dashed" } else { "style=dotted" };
    writeln!(
        out,
        "  {} -> {} [{else_style}];",
        node_name(manager, regular),
        node_name(manager, else_edge.regular())
    )
    .unwrap();
    visit(manager, else_edge.regular(), visited, out);
}

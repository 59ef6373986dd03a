//! Target dependency ordering.
//!
//! `deps` edges across the whole project form a graph that must be
//! acyclic. Topological order (dependencies first) drives makefile rule
//! ordering and solution dependency sections.

use std::collections::HashMap;

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::DiGraph;

use crate::util::diagnostic::RecipeError;
use crate::util::interning::Symbol;

/// Compute dependency-first order for `(target, deps)` pairs.
///
/// Deps must already be validated to name existing targets.
pub(crate) fn dependency_order(
    items: &[(Symbol, Vec<Symbol>)],
) -> Result<Vec<Symbol>, RecipeError> {
    let mut graph = DiGraph::<Symbol, ()>::new();
    let mut nodes = HashMap::new();

    for (name, _) in items {
        nodes.insert(*name, graph.add_node(*name));
    }
    for (name, deps) in items {
        for dep in deps {
            // dep -> dependent, so toposort yields dependencies first
            graph.add_edge(nodes[dep], nodes[name], ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|n| graph[n]).collect()),
        Err(_) => {
            let cycle = kosaraju_scc(&graph)
                .into_iter()
                .find(|scc| scc.len() > 1 || graph.find_edge(scc[0], scc[0]).is_some())
                .unwrap_or_default();
            let mut names: Vec<&str> = cycle.iter().map(|n| graph[*n].as_str()).collect();
            names.sort();
            Err(RecipeError::DependencyCycle {
                chain: names.join(" -> "),
            })
        }
    }
}

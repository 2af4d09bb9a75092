//! Reference Cycle Analysis
//!
//! Builds the `$ref` graph between definitions and finds every definition
//! that can reach itself, either directly or through a strongly connected
//! group.

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::schema::{Definitions, SchemaNode};

/// Names of the definitions that take part in a reference cycle
pub(crate) fn cyclic_definitions(definitions: &Definitions) -> HashSet<String> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let indices: HashMap<&str, NodeIndex> = definitions
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    for (name, node) in definitions {
        let from = indices[name.as_str()];
        let mut targets = Vec::new();
        collect_refs(node, &mut targets);
        for target in targets {
            // Unresolved targets have no node and cannot close a cycle
            if let Some(&to) = indices.get(target.as_str()) {
                graph.update_edge(from, to, ());
            }
        }
    }

    let mut cyclic = HashSet::new();
    for scc in kosaraju_scc(&graph) {
        if scc.len() == 1 {
            let idx = scc[0];
            let has_self_ref = graph
                .edges_directed(idx, Direction::Outgoing)
                .any(|e| e.target() == idx);
            if !has_self_ref {
                continue;
            }
        }
        cyclic.extend(scc.iter().map(|idx| graph[*idx].to_string()));
    }
    cyclic
}

/// Lookup names of every `$ref` reachable inside one node
fn collect_refs(node: &SchemaNode, out: &mut Vec<String>) {
    match node {
        SchemaNode::Reference(reference) => out.push(reference.lookup_name()),
        SchemaNode::Composed(composed) => {
            for component in composed.all_of.iter().flatten() {
                collect_refs(component, out);
            }
        }
        SchemaNode::Array(array) => collect_refs(&array.items, out),
        SchemaNode::Model(model) => {
            for prop in model.properties.iter().flat_map(|props| props.values()) {
                collect_refs(prop, out);
            }
            if let Some(additional) = &model.additional_properties {
                collect_refs(additional, out);
            }
        }
    }
}

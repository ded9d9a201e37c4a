//! Structural queries over a built graph.

use crate::model::{EdgeKind, Graph, GraphNode, NodeKind};
use std::collections::{HashMap, HashSet};

/// Tags with at least this many distinct co-occurring tags are bridges.
pub const BRIDGE_MIN_NEIGHBORS: usize = 3;

/// Record nodes without any `has_tag` edge.
pub fn find_orphans(graph: &Graph) -> Vec<&GraphNode> {
    let tagged: HashSet<&str> = graph
        .edges_of_kind(EdgeKind::HasTag)
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();
    graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Record && !tagged.contains(n.id.as_str()))
        .collect()
}

/// Tag nodes connecting at least [`BRIDGE_MIN_NEIGHBORS`] other tags.
pub fn find_bridges(graph: &Graph) -> Vec<&GraphNode> {
    let mut neighbors: HashMap<&str, HashSet<&str>> = HashMap::new();
    for e in graph.edges_of_kind(EdgeKind::TagCooccurrence) {
        if e.source == e.target {
            continue;
        }
        neighbors.entry(e.source.as_str()).or_default().insert(e.target.as_str());
        neighbors.entry(e.target.as_str()).or_default().insert(e.source.as_str());
    }
    graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Tag)
        .filter(|n| neighbors.get(n.id.as_str()).map_or(0, HashSet::len) >= BRIDGE_MIN_NEIGHBORS)
        .collect()
}

//! Derive a typed knowledge graph from records.

use crate::model::{EdgeKind, Graph, GraphEdge, GraphNode, NodeKind};
use mw_core::{GraphConfig, Record};
use mw_dedup::hostname;
use mw_fingerprint::{fingerprint_tokens, tokenize, Fingerprint};
use std::collections::{BTreeSet, HashMap, HashSet};

const HUB_BASE_SIZE: f64 = 8.0;
const HUB_SIZE_PER_EDGE: f64 = 2.0;
const HUB_MAX_SIZE: f64 = 20.0;
/// Similarity (0-100) divided by this gives the edge weight.
const SIMILARITY_WEIGHT_DIVISOR: f64 = 50.0;

/// Builds record, tag and source nodes plus their structural edges.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, records: &[Record]) -> Graph {
        let mut nodes: Vec<GraphNode> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut edges: Vec<GraphEdge> = Vec::new();
        let mut cooccurrence: HashMap<(String, String), usize> = HashMap::new();

        let mut ensure = |nodes: &mut Vec<GraphNode>, node: GraphNode| -> bool {
            if index.contains_key(&node.id) {
                return false;
            }
            index.insert(node.id.clone(), nodes.len());
            nodes.push(node);
            true
        };

        for record in records {
            let record_node = GraphNode::new(NodeKind::Record, &record.id, record_label(record), self.config.record_node_size);
            let record_id = record_node.id.clone();
            if !ensure(&mut nodes, record_node) {
                tracing::debug!(id = %record.id, "skipping repeated record id");
                continue;
            }

            if let Some(host) = record.url().and_then(hostname) {
                let source = GraphNode::new(NodeKind::Source, &host, host.clone(), HUB_BASE_SIZE);
                let source_id = source.id.clone();
                ensure(&mut nodes, source);
                edges.push(GraphEdge::new(record_id.clone(), source_id, 1.0, EdgeKind::SameSource));
            }

            let tags: Vec<&str> = record
                .tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            for tag in &tags {
                let tag_node = GraphNode::new(NodeKind::Tag, tag, *tag, HUB_BASE_SIZE);
                let tag_id = tag_node.id.clone();
                ensure(&mut nodes, tag_node);
                edges.push(GraphEdge::new(record_id.clone(), tag_id, 1.0, EdgeKind::HasTag));
            }

            // Sorted and unique, so (a, b) is already the canonical order.
            for (i, a) in tags.iter().enumerate() {
                for b in &tags[i + 1..] {
                    let key = (a.to_string(), b.to_string());
                    match cooccurrence.get(&key) {
                        Some(&edge) => edges[edge].weight += 1.0,
                        None => {
                            cooccurrence.insert(key, edges.len());
                            edges.push(GraphEdge::new(
                                NodeKind::Tag.node_id(a),
                                NodeKind::Tag.node_id(b),
                                1.0,
                                EdgeKind::TagCooccurrence,
                            ));
                        }
                    }
                }
            }
        }

        let mut graph = Graph { nodes, edges };
        resize_hubs(&mut graph);
        tracing::debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "built graph");
        graph
    }

    /// Add `content_similarity` edges between record nodes whose composite
    /// text fingerprints are within the configured Hamming distance.
    pub fn add_similarity_edges(&self, graph: Graph, records: &[Record]) -> Graph {
        add_similarity_edges_with_text(graph, records, self.config.similarity_threshold, &HashMap::new())
    }
}

fn record_label(record: &Record) -> String {
    let title = record.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    record.url().map(str::to_string).unwrap_or_else(|| record.id.clone())
}

/// `size = min(20, 8 + 2 * incident edges)` for tag and source nodes.
fn resize_hubs(graph: &mut Graph) {
    let mut degree: HashMap<&str, usize> = HashMap::new();
    for e in &graph.edges {
        *degree.entry(e.source.as_str()).or_default() += 1;
        *degree.entry(e.target.as_str()).or_default() += 1;
    }
    let sizes: Vec<Option<f64>> = graph
        .nodes
        .iter()
        .map(|n| match n.kind {
            NodeKind::Record => None,
            NodeKind::Tag | NodeKind::Source => {
                let connections = degree.get(n.id.as_str()).copied().unwrap_or(0) as f64;
                Some((HUB_BASE_SIZE + HUB_SIZE_PER_EDGE * connections).min(HUB_MAX_SIZE))
            }
        })
        .collect();
    for (node, size) in graph.nodes.iter_mut().zip(sizes) {
        if let Some(size) = size {
            node.size = size;
        }
    }
}

/// Build with default [`GraphConfig`].
pub fn build_graph(records: &[Record]) -> Graph {
    GraphBuilder::default().build(records)
}

pub fn add_similarity_edges(graph: Graph, records: &[Record], threshold: u32) -> Graph {
    add_similarity_edges_with_text(graph, records, threshold, &HashMap::new())
}

/// Like [`add_similarity_edges`], with extra text per record id (for example
/// content extracted from the bookmarked page) folded into the fingerprint.
pub fn add_similarity_edges_with_text(
    mut graph: Graph,
    records: &[Record],
    threshold: u32,
    extracted: &HashMap<String, String>,
) -> Graph {
    let present: HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Record)
        .map(|n| n.id.as_str())
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries: Vec<(String, Fingerprint)> = Vec::new();
    for record in records {
        let node_id = NodeKind::Record.node_id(&record.id);
        if !present.contains(node_id.as_str()) || !seen.insert(record.id.as_str()) {
            continue;
        }
        let tokens = tokenize(&composite_text(record, extracted.get(&record.id)));
        // No tokens means the zero fingerprint, which matches every other empty record.
        if tokens.is_empty() {
            continue;
        }
        entries.push((node_id, fingerprint_tokens(&tokens)));
    }

    let existing: HashSet<(String, String)> = graph
        .edges_of_kind(EdgeKind::ContentSimilarity)
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect();

    let mut added = 0usize;
    for (i, (a_id, a_fp)) in entries.iter().enumerate() {
        for (b_id, b_fp) in &entries[i + 1..] {
            if a_fp.hamming_distance(b_fp) > threshold {
                continue;
            }
            if existing.contains(&(a_id.clone(), b_id.clone())) || existing.contains(&(b_id.clone(), a_id.clone())) {
                continue;
            }
            let weight = f64::from(a_fp.similarity(b_fp)) / SIMILARITY_WEIGHT_DIVISOR;
            graph.edges.push(GraphEdge::new(a_id.clone(), b_id.clone(), weight, EdgeKind::ContentSimilarity));
            added += 1;
        }
    }
    tracing::debug!(records = entries.len(), added, "similarity edges");
    graph
}

fn composite_text(record: &Record, extracted: Option<&String>) -> String {
    let mut parts: Vec<&str> = vec![record.title.as_str()];
    if let Some(desc) = record.description.as_deref() {
        parts.push(desc);
    }
    parts.extend(record.tags.iter().map(String::as_str));
    if let Some(text) = extracted {
        parts.push(text.as_str());
    }
    parts.join(" ")
}

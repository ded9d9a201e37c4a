//! Knowledge graph container handed to the rendering collaborator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Record,
    Tag,
    Source,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Tag => "tag",
            Self::Source => "source",
        }
    }

    /// Stable node id for a record id, tag string or hostname.
    pub fn node_id(&self, key: &str) -> String {
        format!("{}:{key}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    SameSource,
    HasTag,
    TagCooccurrence,
    ContentSimilarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Visual weight.
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
}

impl GraphNode {
    pub fn new(kind: NodeKind, key: &str, label: impl Into<String>, size: f64) -> Self {
        Self {
            id: kind.node_id(key),
            kind,
            label: label.into(),
            size,
            position: None,
        }
    }
}

/// Directed for storage; symmetric for layout and queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            kind,
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite `id`, if the edge touches it.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Node and edge counts by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub records: usize,
    pub tags: usize,
    pub sources: usize,
    pub same_source: usize,
    pub has_tag: usize,
    pub tag_cooccurrence: usize,
    pub content_similarity: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Node id to position in `nodes`.
    pub fn index(&self) -> HashMap<&str, usize> {
        self.nodes.iter().enumerate().map(|(i, n)| (n.id.as_str(), i)).collect()
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Distinct neighbour ids over all edge kinds, sorted.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let set: BTreeSet<&str> = self.edges.iter().filter_map(|e| e.other(id)).collect();
        set.into_iter().collect()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.touches(id)).count()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for n in &self.nodes {
            match n.kind {
                NodeKind::Record => stats.records += 1,
                NodeKind::Tag => stats.tags += 1,
                NodeKind::Source => stats.sources += 1,
            }
        }
        for e in &self.edges {
            match e.kind {
                EdgeKind::SameSource => stats.same_source += 1,
                EdgeKind::HasTag => stats.has_tag += 1,
                EdgeKind::TagCooccurrence => stats.tag_cooccurrence += 1,
                EdgeKind::ContentSimilarity => stats.content_similarity += 1,
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a GraphNode;
    type IntoIter = std::slice::Iter<'a, GraphNode>;
    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

use crate::error::{MwError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration. Every section falls back to its defaults, so a
/// partial JSON document only needs the keys it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkweaveConfig {
    pub dedup: DedupConfig,
    pub graph: GraphConfig,
    pub layout: LayoutConfig,
}

/// Duplicate-detection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum combined same-domain score (0-100) for a `similar_url` match.
    pub url_threshold: u8,
    /// Title similarity (0-100) below which the title term is ignored.
    pub title_threshold: u8,
    /// Maximum Hamming distance for a fingerprint match (6 is roughly 90%).
    pub fingerprint_distance: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            url_threshold: 85,
            title_threshold: 80,
            fingerprint_distance: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum Hamming distance for a `content_similarity` edge.
    pub similarity_threshold: u32,
    /// Visual weight of record nodes.
    pub record_node_size: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 10,
            record_node_size: 10.0,
        }
    }
}

/// Force-directed layout parameters. The `*_large` variants replace their
/// base value once the graph has more than `large_graph_nodes` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub iterations: usize,
    pub margin: f64,
    pub theta: f64,
    pub theta_large: f64,
    pub large_graph_nodes: usize,
    /// `c` in `k = sqrt(area / n) * c`.
    pub ideal_distance_scale: f64,
    /// Inverse-square repulsion strength is `repulsion * k^3`.
    pub repulsion: f64,
    pub attraction: f64,
    pub attraction_large: f64,
    pub gravity: f64,
    pub gravity_large: f64,
    /// Fraction of velocity retained between iterations.
    pub damping: f64,
    /// Per-node displacement below which the layout counts as settled.
    pub settle_per_node: f64,
    /// Graphs at or below this size use exact pairwise repulsion.
    pub barnes_hut_min_nodes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            margin: 40.0,
            theta: 0.5,
            theta_large: 0.7,
            large_graph_nodes: 100,
            ideal_distance_scale: 0.75,
            repulsion: 0.1,
            attraction: 0.06,
            attraction_large: 0.1,
            gravity: 0.02,
            gravity_large: 0.05,
            damping: 0.85,
            settle_per_node: 0.5,
            barnes_hut_min_nodes: 32,
        }
    }
}

impl MarkweaveConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Reject values the algorithms treat as caller preconditions.
    pub fn validate(&self) -> Result<()> {
        if self.dedup.url_threshold > 100 || self.dedup.title_threshold > 100 {
            return Err(MwError::Config("dedup thresholds must be within 0..=100".into()));
        }
        if self.dedup.fingerprint_distance > 64 || self.graph.similarity_threshold > 64 {
            return Err(MwError::Config("hamming thresholds must be within 0..=64".into()));
        }
        if self.layout.iterations == 0 {
            return Err(MwError::Config("layout.iterations must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.layout.damping) {
            return Err(MwError::Config("layout.damping must be within [0, 1)".into()));
        }
        let positive = [
            ("layout.theta", self.layout.theta),
            ("layout.theta_large", self.layout.theta_large),
            ("layout.ideal_distance_scale", self.layout.ideal_distance_scale),
            ("graph.record_node_size", self.graph.record_node_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(MwError::Config(format!("{name} must be a positive number")));
            }
        }
        if !self.layout.margin.is_finite() || self.layout.margin < 0.0 {
            return Err(MwError::Config("layout.margin must be non-negative".into()));
        }
        Ok(())
    }
}

use mw_core::{load_records, MarkweaveConfig, Record, Result};
use mw_dedup::{DuplicatePipeline, DuplicateReport, MergeAction};
use mw_graph::{find_bridges, find_orphans, ForceLayout, Graph, GraphBuilder, GraphStats};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Shared, cheaply cloneable handle over a validated [`MarkweaveConfig`].
#[derive(Debug, Clone)]
pub struct Engine {
    config: Arc<MarkweaveConfig>,
}

/// Everything the UI needs for one collection in a single pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub duplicates: DuplicateReport,
    pub graph: Graph,
    pub stats: GraphStats,
    /// Record node ids without tags.
    pub orphans: Vec<String>,
    /// Tag node ids linking many other tags.
    pub bridges: Vec<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self { config: Arc::new(MarkweaveConfig::default()) }
    }
}

impl Engine {
    pub fn new(config: MarkweaveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config: Arc::new(config) })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self { config: Arc::new(MarkweaveConfig::from_json_str(json)?) })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self { config: Arc::new(MarkweaveConfig::from_file(path)?) })
    }

    pub fn config(&self) -> &MarkweaveConfig {
        &self.config
    }

    /// Read a JSON records export from disk.
    pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let content = tokio::fs::read_to_string(path).await?;
        load_records(&content)
    }

    pub fn find_duplicates(&self, records: &[Record]) -> DuplicateReport {
        let start = Instant::now();
        let report = DuplicatePipeline::new(self.config.dedup.clone()).run(records);
        tracing::info!(
            records = records.len(),
            groups = report.groups.len(),
            duplicates = report.total_duplicates,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "duplicate scan finished"
        );
        report
    }

    /// Structural graph, optionally enriched with content-similarity edges.
    pub fn build_graph(&self, records: &[Record], with_similarity: bool) -> Graph {
        let builder = GraphBuilder::new(self.config.graph.clone());
        let mut graph = builder.build(records);
        if with_similarity {
            graph = builder.add_similarity_edges(graph, records);
        }
        tracing::info!(nodes = graph.len(), edges = graph.edges.len(), with_similarity, "graph built");
        graph
    }

    /// Like [`Engine::build_graph`] with similarity edges, folding extra text
    /// per record id into each fingerprint.
    pub fn build_graph_with_text(&self, records: &[Record], extracted: &HashMap<String, String>) -> Graph {
        let graph = GraphBuilder::new(self.config.graph.clone()).build(records);
        mw_graph::add_similarity_edges_with_text(graph, records, self.config.graph.similarity_threshold, extracted)
    }

    pub fn layout(&self, graph: Graph, width: f64, height: f64) -> Graph {
        let start = Instant::now();
        let nodes = graph.len();
        let graph = mw_graph::layout_with(graph, width, height, &self.config.layout);
        tracing::info!(nodes, elapsed_ms = start.elapsed().as_millis() as u64, "layout finished");
        graph
    }

    /// A layout the caller advances in batches.
    pub fn layout_stepper(&self, graph: Graph, width: f64, height: f64) -> ForceLayout {
        ForceLayout::new(graph, width, height, &self.config.layout)
    }

    pub fn analyze(&self, records: &[Record], width: f64, height: f64) -> Analysis {
        let duplicates = self.find_duplicates(records);
        let graph = self.layout(self.build_graph(records, true), width, height);
        let orphans = find_orphans(&graph).into_iter().map(|n| n.id.clone()).collect();
        let bridges = find_bridges(&graph).into_iter().map(|n| n.id.clone()).collect();
        Analysis { stats: graph.stats(), duplicates, graph, orphans, bridges }
    }

    pub fn validate_merge(&self, report: &DuplicateReport, group_id: &str, action: &MergeAction) -> Result<()> {
        report.validate_merge(group_id, action).inspect_err(|err| {
            tracing::warn!(group_id, keep = %action.keep_id, error = %err, "rejected merge");
        })
    }
}

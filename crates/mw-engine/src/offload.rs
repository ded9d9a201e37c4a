//! Async wrappers that move the CPU-bound work onto tokio's blocking pool so
//! a host's event loop stays responsive.

use crate::engine::{Analysis, Engine};
use mw_core::{MwError, Record, Result};
use mw_dedup::DuplicateReport;
use mw_graph::Graph;

async fn offload<T, F>(task: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|err| {
        tracing::error!(task, error = %err, "background task failed");
        MwError::Task(format!("{task}: {err}"))
    })
}

impl Engine {
    pub async fn find_duplicates_async(&self, records: Vec<Record>) -> Result<DuplicateReport> {
        let engine = self.clone();
        offload("find_duplicates", move || engine.find_duplicates(&records)).await
    }

    pub async fn build_graph_async(&self, records: Vec<Record>, with_similarity: bool) -> Result<Graph> {
        let engine = self.clone();
        offload("build_graph", move || engine.build_graph(&records, with_similarity)).await
    }

    pub async fn layout_async(&self, graph: Graph, width: f64, height: f64) -> Result<Graph> {
        let engine = self.clone();
        offload("layout", move || engine.layout(graph, width, height)).await
    }

    /// Stepwise layout that yields to the runtime after every `batch` steps.
    pub async fn layout_cooperative(&self, graph: Graph, width: f64, height: f64, batch: usize) -> Graph {
        let mut stepper = self.layout_stepper(graph, width, height);
        while !stepper.is_done() {
            stepper.run(batch.max(1));
            tokio::task::yield_now().await;
        }
        stepper.into_graph()
    }

    pub async fn analyze_async(&self, records: Vec<Record>, width: f64, height: f64) -> Result<Analysis> {
        let engine = self.clone();
        offload("analyze", move || engine.analyze(&records, width, height)).await
    }
}

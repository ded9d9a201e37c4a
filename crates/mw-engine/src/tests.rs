use crate::*;
use mw_core::{MarkweaveConfig, MwError, Record};
use mw_dedup::{DuplicateReason, MergeAction};
use mw_graph::{EdgeKind, NodeKind};
use std::collections::HashMap;

fn sample() -> Vec<Record> {
    vec![
        Record::new("a", "Rust ownership guide")
            .with_url("https://www.example.com/path/?utm_source=x")
            .with_tags(["rust"])
            .with_created_at(1_000),
        Record::new("b", "Rust ownership guide")
            .with_url("http://example.com/path")
            .with_tags(["rust"])
            .with_created_at(2_000),
        Record::new("c", "Sourdough bread baking hydration")
            .with_url("https://bread.example.org/x")
            .with_tags(["baking"]),
        Record::new("d", "Untagged note"),
    ]
}

// ========== Construction ==========

#[test]
fn test_default_engine_uses_defaults() {
    assert_eq!(Engine::default().config(), &MarkweaveConfig::default());
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = MarkweaveConfig::default();
    config.dedup.url_threshold = 101;
    assert!(matches!(Engine::new(config), Err(MwError::Config(_))));
}

#[test]
fn test_from_json_partial() {
    let engine = Engine::from_json_str(r#"{"graph": {"similarity_threshold": 3}}"#).unwrap();
    assert_eq!(engine.config().graph.similarity_threshold, 3);
    assert_eq!(engine.config().dedup.url_threshold, 85);
}

#[test]
fn test_from_json_malformed() {
    assert!(matches!(Engine::from_json_str("{"), Err(MwError::Serialization(_))));
}

// ========== Duplicates ==========

#[test]
fn test_find_duplicates() {
    let report = Engine::default().find_duplicates(&sample());
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].reason, DuplicateReason::ExactUrl);
    assert_eq!(report.groups[0].members, vec!["a", "b"]);
}

#[test]
fn test_validate_merge() {
    let engine = Engine::default();
    let records = sample();
    let report = engine.find_duplicates(&records);
    let group = &report.groups[0];

    let action = MergeAction::keep_oldest(group, &records).unwrap();
    assert_eq!(action.keep_id, "a");
    assert!(engine.validate_merge(&report, &group.id, &action).is_ok());

    let stray = MergeAction::new("a", vec!["c".to_string()]);
    assert!(matches!(engine.validate_merge(&report, &group.id, &stray), Err(MwError::InvalidMerge(_))));
    assert!(matches!(
        engine.validate_merge(&report, "missing", &action),
        Err(MwError::UnknownGroup { .. })
    ));
}

// ========== Graph ==========

#[test]
fn test_build_graph_without_similarity() {
    let graph = Engine::default().build_graph(&sample(), false);
    let stats = graph.stats();
    assert_eq!((stats.records, stats.tags, stats.sources), (4, 2, 2));
    assert_eq!(stats.content_similarity, 0);
}

#[test]
fn test_build_graph_with_similarity() {
    let graph = Engine::default().build_graph(&sample(), true);
    let sim: Vec<_> = graph.edges_of_kind(EdgeKind::ContentSimilarity).collect();
    assert_eq!(sim.len(), 1);
    assert_eq!((sim[0].source.as_str(), sim[0].target.as_str()), ("record:a", "record:b"));
}

#[test]
fn test_build_graph_threshold_from_config() {
    let engine = Engine::from_json_str(r#"{"graph": {"similarity_threshold": 64}}"#).unwrap();
    // Every pair of the four records is within 64 bits.
    assert_eq!(engine.build_graph(&sample(), true).stats().content_similarity, 6);
}

#[test]
fn test_build_graph_with_text() {
    let mut extracted = HashMap::new();
    extracted.insert("b".to_string(), "chocolate cake recipe frosting butter sugar flour".to_string());
    let graph = Engine::default().build_graph_with_text(&sample(), &extracted);
    // The extra text pushes b 19 bits away from a.
    assert_eq!(graph.stats().content_similarity, 0);
    assert_eq!(graph.stats().records, 4);
}

// ========== Layout ==========

#[test]
fn test_layout_in_bounds() {
    let engine = Engine::default();
    let margin = engine.config().layout.margin;
    let graph = engine.layout(engine.build_graph(&sample(), true), 640.0, 480.0);
    for node in &graph {
        let p = node.position.unwrap();
        assert!(p.x >= margin && p.x <= 640.0 - margin);
        assert!(p.y >= margin && p.y <= 480.0 - margin);
    }
}

#[test]
fn test_layout_stepper_matches_layout() {
    let engine = Engine::default();
    let graph = engine.build_graph(&sample(), true);
    let expected = engine.layout(graph.clone(), 640.0, 480.0);
    let mut stepper = engine.layout_stepper(graph, 640.0, 480.0);
    while stepper.run(5) > 0 {}
    assert_eq!(stepper.into_graph(), expected);
}

#[test]
fn test_analyze() {
    let analysis = Engine::default().analyze(&sample(), 800.0, 600.0);
    assert_eq!(analysis.duplicates.groups.len(), 1);
    assert_eq!(analysis.orphans, vec!["record:d"]);
    assert!(analysis.bridges.is_empty());
    assert_eq!(analysis.stats, analysis.graph.stats());
    assert!(analysis.graph.nodes.iter().all(|n| n.position.is_some()));
    assert!(analysis.graph.nodes.iter().any(|n| n.kind == NodeKind::Source));

    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json["duplicates"]["totalDuplicates"].is_number());
    assert!(json["graph"]["nodes"].is_array());
}

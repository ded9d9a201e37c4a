use crate::*;
use mw_core::{DedupConfig, MwError, Record};

fn rec(id: &str, title: &str, url: Option<&str>) -> Record {
    let r = Record::new(id, title);
    match url {
        Some(u) => r.with_url(u),
        None => r,
    }
}

fn default_run(records: &[Record]) -> DuplicateReport {
    find_duplicates(records, 85, 80)
}

// ========== URL normalization ==========

#[test]
fn test_normalize_strips_scheme_www_tracking_slash() {
    assert_eq!(
        normalize_url("https://www.example.com/path/?utm_source=x"),
        normalize_url("http://example.com/path")
    );
    assert_eq!(normalize_url("http://example.com/path"), "example.com/path");
}

#[test]
fn test_normalize_keeps_real_query() {
    assert_eq!(
        normalize_url("https://example.com/search?q=rust&utm_medium=email&fbclid=abc"),
        "example.com/search?q=rust"
    );
}

#[test]
fn test_normalize_lowercases_and_drops_fragment() {
    assert_eq!(normalize_url("HTTPS://Example.COM/Docs#Intro"), "example.com/docs");
}

#[test]
fn test_normalize_root() {
    assert_eq!(normalize_url("https://example.com/"), "example.com");
    assert_eq!(normalize_url("https://example.com"), "example.com");
}

#[test]
fn test_normalize_keeps_non_default_port() {
    assert_eq!(normalize_url("http://localhost:8080/app/"), "localhost:8080/app");
    assert_eq!(normalize_url("http://example.com:80/app"), "example.com/app");
}

#[test]
fn test_normalize_text_fallback() {
    assert_eq!(normalize_url("www.Example.com/Path/?utm_campaign=z"), "example.com/path");
    assert_eq!(normalize_url("Not A URL/"), "not a url");
    assert_eq!(normalize_url(""), "");
}

#[test]
fn test_hostname() {
    assert_eq!(hostname("https://www.rust-lang.org/learn").as_deref(), Some("rust-lang.org"));
    assert_eq!(hostname("https://docs.rs/serde").as_deref(), Some("docs.rs"));
    assert_eq!(hostname("example.com/path"), None);
    assert_eq!(hostname("mailto:someone@example.com"), None);
    assert_eq!(hostname("garbage"), None);
}

// ========== Edit distance ==========

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("sitting", "kitten"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("abc", ""), 3);
    assert_eq!(levenshtein("same", "same"), 0);
    assert_eq!(levenshtein("flaw", "lawn"), 2);
}

#[test]
fn test_levenshtein_unicode() {
    assert_eq!(levenshtein("café", "cafe"), 1);
}

#[test]
fn test_normalized_similarity() {
    assert_eq!(normalized_similarity("", ""), 1.0);
    assert_eq!(normalized_similarity("Rust", "rust"), 1.0);
    assert_eq!(normalized_similarity("abcd", "abce"), 0.75);
    assert_eq!(normalized_similarity("abc", "xyz"), 0.0);
}

// ========== Union-find ==========

#[test]
fn test_disjoint_set_union_and_find() {
    let mut ds = DisjointSet::new();
    assert!(ds.union(1, 2));
    assert!(ds.union(3, 2));
    assert!(!ds.union(1, 3));
    assert!(ds.connected(1, 3));
    assert!(!ds.connected(1, 4));
    assert_eq!(ds.find(3), 1);
}

#[test]
fn test_disjoint_set_groups() {
    let mut ds = DisjointSet::new();
    ds.union(5, 6);
    ds.union(0, 9);
    ds.union(6, 7);
    assert_eq!(ds.groups(), vec![vec![0, 9], vec![5, 6, 7]]);
}

#[test]
fn test_disjoint_set_long_chain_compresses() {
    let mut ds = DisjointSet::new();
    for i in 0..1000 {
        ds.union(i, i + 1);
    }
    assert_eq!(ds.find(1000), 0);
    assert_eq!(ds.groups().len(), 1);
}

// ========== Pipeline ==========

#[test]
fn test_empty_input() {
    let report = default_run(&[]);
    assert!(report.is_empty());
    assert_eq!(report.total_duplicates, 0);
    assert_eq!(report.potential_savings, 0);
}

#[test]
fn test_exact_url_group() {
    let records = vec![
        rec("a", "Example", Some("https://www.example.com/path/?utm_source=x")),
        rec("b", "Example page", Some("http://example.com/path")),
    ];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 1);
    let g = &report.groups[0];
    assert_eq!(g.reason, DuplicateReason::ExactUrl);
    assert_eq!(g.similarity, 100);
    assert_eq!(g.members, vec!["a", "b"]);
    assert_eq!(report.total_duplicates, 2);
    assert_eq!(report.potential_savings, 1);
}

#[test]
fn test_exact_url_malformed_fallback() {
    let records = vec![rec("a", "x", Some("Not A URL/")), rec("b", "y", Some("not a url"))];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].reason, DuplicateReason::ExactUrl);
}

#[test]
fn test_distinct_records_no_groups() {
    let records = vec![
        rec("a", "Chocolate cake recipe", Some("https://recipes.example.org/cake")),
        rec("b", "Kubernetes networking deep dive", Some("https://k8s.io/docs/concepts/networking")),
        rec("c", "Travel guide to Lisbon", Some("https://lonelyplanet.com/portugal/lisbon")),
    ];
    let report = default_run(&records);
    assert!(report.is_empty());
}

#[test]
fn test_same_domain_similar_url() {
    let records = vec![
        rec("a", "Ownership, part one", Some("https://blog.example.com/posts/rust-ownership-guide-part-1")),
        rec("b", "Borrowing explained", Some("https://blog.example.com/posts/rust-ownership-guide-part-2")),
    ];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 1);
    let g = &report.groups[0];
    assert_eq!(g.reason, DuplicateReason::SimilarUrl);
    assert_eq!(g.members, vec!["a", "b"]);
    assert_eq!(g.similarity, 98);
}

#[test]
fn test_same_domain_dissimilar_urls_not_grouped() {
    let records = vec![
        rec("a", "Pricing", Some("https://example.com/pricing")),
        rec("b", "Careers at the company", Some("https://example.com/about/careers/engineering")),
    ];
    assert!(default_run(&records).is_empty());
}

#[test]
fn test_url_threshold_controls_stage_two() {
    let records = vec![
        rec("a", "One", Some("https://example.com/docs/alpha")),
        rec("b", "Two", Some("https://example.com/docs/beta")),
    ];
    assert!(default_run(&records).is_empty());
    let loose = find_duplicates(&records, 50, 80);
    assert_eq!(loose.groups.len(), 1);
    assert_eq!(loose.groups[0].reason, DuplicateReason::SimilarUrl);
}

#[test]
fn test_exact_stage_takes_precedence() {
    let records = vec![
        rec("a", "Guide", Some("https://example.com/guide/part-1")),
        rec("b", "Guide copy", Some("https://example.com/guide/part-1/")),
        rec("c", "Guide next", Some("https://example.com/guide/part-2")),
    ];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].reason, DuplicateReason::ExactUrl);
    assert!(!report.groups[0].contains("c"));
}

#[test]
fn test_fingerprint_chain_is_transitive() {
    // a~b and b~c are within 6 bits; a and c are 8 bits apart.
    let records = vec![
        rec("a", "macros closures rust lifetimes traits network quadtree travel tutorial crates parser music benchmark modules", None),
        rec("b", "macros closures rust lifetimes traits network quadtree travel tutorial crates parser runtime benchmark modules", None),
        rec("c", "macros closures rust lifetimes traits iterators quadtree travel tutorial crates parser runtime benchmark modules", None),
    ];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 1);
    let g = &report.groups[0];
    assert_eq!(g.reason, DuplicateReason::SimilarTitle);
    assert_eq!(g.members, vec!["a", "b", "c"]);
    assert_eq!(g.similarity, 95);
    assert_eq!(report.potential_savings, 2);
}

#[test]
fn test_fingerprint_identical_titles_without_urls() {
    let records = vec![
        rec("a", "Async Rust runtime internals", None),
        rec("b", "async rust: runtime internals!", None),
        rec("c", "Sourdough starter feeding schedule", None),
    ];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].members, vec!["a", "b"]);
    assert_eq!(report.groups[0].similarity, 100);
}

#[test]
fn test_empty_text_records_not_grouped() {
    let records = vec![rec("a", "", None), rec("b", "the and of", None), rec("c", "!!!", None)];
    assert!(default_run(&records).is_empty());
}

#[test]
fn test_groups_are_disjoint_and_sorted() {
    let records = vec![
        rec("a", "Ownership, part one", Some("https://blog.example.com/posts/rust-ownership-guide-part-1")),
        rec("b", "Borrowing explained", Some("https://blog.example.com/posts/rust-ownership-guide-part-2")),
        rec("c", "Example", Some("https://www.example.com/path")),
        rec("d", "Example", Some("http://example.com/path/")),
        rec("e", "Async Rust runtime internals", None),
        rec("f", "async rust: runtime internals!", None),
    ];
    let report = default_run(&records);
    assert_eq!(report.groups.len(), 3);
    assert!(report.groups.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    let mut seen = std::collections::HashSet::new();
    for g in &report.groups {
        for m in &g.members {
            assert!(seen.insert(m.clone()), "{m} appears in two groups");
        }
    }
    assert_eq!(report.total_duplicates, 6);
    assert_eq!(report.potential_savings, 3);
}

#[test]
fn test_group_ids_deterministic() {
    let records = vec![
        rec("a", "Example", Some("https://example.com/x")),
        rec("b", "Example", Some("https://example.com/x/")),
    ];
    let first = default_run(&records);
    let second = default_run(&records);
    assert_eq!(first.groups[0].id, second.groups[0].id);
    assert!(first.group(&first.groups[0].id).is_some());
}

#[test]
fn test_pipeline_from_config() {
    let pipeline = DuplicatePipeline::new(DedupConfig { fingerprint_distance: 0, ..DedupConfig::default() });
    let records = vec![
        rec("a", "macros closures rust lifetimes traits network quadtree travel tutorial crates parser music benchmark modules", None),
        rec("b", "macros closures rust lifetimes traits network quadtree travel tutorial crates parser runtime benchmark modules", None),
    ];
    assert!(pipeline.run(&records).is_empty());
    assert_eq!(DuplicatePipeline::default().run(&records).groups.len(), 1);
}

#[test]
fn test_report_serializes_snake_case_reason() {
    let records = vec![
        rec("a", "Example", Some("https://example.com/x")),
        rec("b", "Example", Some("https://example.com/x")),
    ];
    let json = serde_json::to_string(&default_run(&records)).unwrap();
    assert!(json.contains("\"reason\":\"exact_url\""));
    assert!(json.contains("\"potentialSavings\":1"));
}

// ========== Merge ==========

fn merge_fixture() -> (Vec<Record>, DuplicateReport) {
    let records = vec![
        rec("a", "Example", Some("https://example.com/x")).with_created_at(300),
        rec("b", "Example", Some("https://example.com/x/")).with_created_at(100),
        rec("c", "Example", Some("http://www.example.com/x")).with_created_at(200),
    ];
    let report = default_run(&records);
    (records, report)
}

#[test]
fn test_merge_keep_oldest() {
    let (records, report) = merge_fixture();
    let action = MergeAction::keep_oldest(&report.groups[0], &records).unwrap();
    assert_eq!(action.keep_id, "b");
    assert_eq!(action.delete_ids, vec!["a", "c"]);
    assert!(report.validate_merge(&report.groups[0].id, &action).is_ok());
}

#[test]
fn test_merge_rejects_unknown_group() {
    let (_, report) = merge_fixture();
    let action = MergeAction::new("a", vec!["b".into()]);
    assert!(matches!(report.validate_merge("nope", &action), Err(MwError::UnknownGroup { .. })));
}

#[test]
fn test_merge_rejects_foreign_ids() {
    let (_, report) = merge_fixture();
    let gid = report.groups[0].id.clone();
    let outsider = MergeAction::new("z", vec!["a".into()]);
    assert!(matches!(report.validate_merge(&gid, &outsider), Err(MwError::InvalidMerge(_))));
    let foreign_delete = MergeAction::new("a", vec!["z".into()]);
    assert!(matches!(report.validate_merge(&gid, &foreign_delete), Err(MwError::InvalidMerge(_))));
}

#[test]
fn test_merge_rejects_self_delete_and_empty() {
    let (_, report) = merge_fixture();
    let gid = report.groups[0].id.clone();
    let self_delete = MergeAction::new("a", vec!["a".into()]);
    assert!(report.validate_merge(&gid, &self_delete).is_err());
    let empty = MergeAction::new("a", vec![]);
    assert!(report.validate_merge(&gid, &empty).is_err());
    let twice = MergeAction::new("a", vec!["b".into(), "b".into()]);
    assert!(report.validate_merge(&gid, &twice).is_err());
}

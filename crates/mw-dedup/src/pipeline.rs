//! Duplicate detection pipeline with three stages over a shared processed set.
//!
//! 1. Exact URL: identical normalized URLs.
//! 2. Same domain: edit-distance similarity of URL and title within a host.
//! 3. Fingerprint: SimHash + LSH pairs, merged transitively with union-find.
//!
//! A record placed in a group is never considered by a later stage.

use crate::edit_distance::normalized_similarity;
use crate::union_find::DisjointSet;
use crate::url_norm::{hostname, normalize_url};
use mw_core::{DedupConfig, Record};
use mw_fingerprint::{find_similar_pairs, fingerprint_tokens, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

const TITLE_WEIGHT: f64 = 0.8;
const SCORE_EPSILON: f64 = 1e-9;

/// Why a set of records was grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    ExactUrl,
    SimilarUrl,
    SimilarTitle,
}

impl fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactUrl => write!(f, "exact_url"),
            Self::SimilarUrl => write!(f, "similar_url"),
            Self::SimilarTitle => write!(f, "similar_title"),
        }
    }
}

/// Two or more records judged to be duplicates of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    /// Deterministic: derived from the reason and member ids.
    pub id: String,
    /// Record ids in input order.
    pub members: Vec<String>,
    /// 0-100.
    pub similarity: u8,
    pub reason: DuplicateReason,
}

impl DuplicateGroup {
    fn new(members: Vec<String>, similarity: u8, reason: DuplicateReason) -> Self {
        let key = format!("{reason}:{}", members.join("\u{1f}"));
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string();
        Self { id, members, similarity, reason }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, record_id: &str) -> bool {
        self.members.iter().any(|m| m == record_id)
    }
}

/// Pipeline output handed to the merge collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    /// Most similar first.
    pub groups: Vec<DuplicateGroup>,
    /// Sum of group sizes.
    pub total_duplicates: usize,
    /// Records removable by keeping one per group.
    pub potential_savings: usize,
}

impl DuplicateReport {
    fn from_groups(mut groups: Vec<DuplicateGroup>) -> Self {
        groups.sort_by(|a, b| b.similarity.cmp(&a.similarity));
        let total_duplicates = groups.iter().map(DuplicateGroup::len).sum();
        let potential_savings = groups.iter().map(|g| g.len() - 1).sum();
        Self { groups, total_duplicates, potential_savings }
    }

    pub fn group(&self, id: &str) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Per-record values computed once and shared by all stages.
struct Prepared<'a> {
    record: &'a Record,
    normalized_url: Option<String>,
    host: Option<String>,
}

impl<'a> Prepared<'a> {
    fn new(record: &'a Record) -> Self {
        let url = record.url();
        Self {
            record,
            normalized_url: url.map(normalize_url),
            host: url.and_then(hostname),
        }
    }
}

/// The duplicate detection pipeline.
#[derive(Debug, Clone, Default)]
pub struct DuplicatePipeline {
    pub config: DedupConfig,
}

impl DuplicatePipeline {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    pub fn with_thresholds(url_threshold: u8, title_threshold: u8) -> Self {
        Self::new(DedupConfig {
            url_threshold,
            title_threshold,
            ..DedupConfig::default()
        })
    }

    /// Run all three stages. Never fails; empty input gives an empty report.
    pub fn run(&self, records: &[Record]) -> DuplicateReport {
        let prepared: Vec<Prepared<'_>> = records.iter().map(Prepared::new).collect();
        let mut processed: HashSet<usize> = HashSet::new();
        let mut groups = Vec::new();

        let exact = exact_url_stage(&prepared, &mut processed);
        tracing::debug!(groups = exact.len(), "exact url stage");
        groups.extend(exact);

        let similar = same_domain_stage(&prepared, &mut processed, &self.config);
        tracing::debug!(groups = similar.len(), "same domain stage");
        groups.extend(similar);

        let fuzzy = fingerprint_stage(&prepared, &mut processed, self.config.fingerprint_distance);
        tracing::debug!(groups = fuzzy.len(), "fingerprint stage");
        groups.extend(fuzzy);

        DuplicateReport::from_groups(groups)
    }
}

/// Run the pipeline with the given thresholds and the default fingerprint distance.
pub fn find_duplicates(records: &[Record], url_threshold: u8, title_threshold: u8) -> DuplicateReport {
    DuplicatePipeline::with_thresholds(url_threshold, title_threshold).run(records)
}

fn ids(prepared: &[Prepared<'_>], members: &[usize]) -> Vec<String> {
    members.iter().map(|&i| prepared[i].record.id.clone()).collect()
}

/// Keys in first-seen order, each with the positions that produced it.
fn group_in_order<'k>(keys: impl Iterator<Item = (usize, &'k str)>) -> Vec<Vec<usize>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    for (idx, key) in keys {
        let slot = *slots.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(idx);
    }
    buckets
}

fn exact_url_stage(prepared: &[Prepared<'_>], processed: &mut HashSet<usize>) -> Vec<DuplicateGroup> {
    let keyed = prepared.iter().enumerate().filter_map(|(i, p)| {
        p.normalized_url.as_deref().filter(|u| !u.is_empty()).map(|u| (i, u))
    });
    let mut groups = Vec::new();
    for members in group_in_order(keyed) {
        if members.len() < 2 {
            continue;
        }
        processed.extend(members.iter().copied());
        groups.push(DuplicateGroup::new(ids(prepared, &members), 100, DuplicateReason::ExactUrl));
    }
    groups
}

fn same_domain_stage(
    prepared: &[Prepared<'_>],
    processed: &mut HashSet<usize>,
    config: &DedupConfig,
) -> Vec<DuplicateGroup> {
    let url_threshold = f64::from(config.url_threshold) / 100.0;
    let title_threshold = f64::from(config.title_threshold) / 100.0;
    let keyed = prepared
        .iter()
        .enumerate()
        .filter(|(i, _)| !processed.contains(i))
        .filter_map(|(i, p)| p.host.as_deref().map(|h| (i, h)));
    let domains = group_in_order(keyed);

    let mut groups = Vec::new();
    for domain in domains {
        for (pos, &anchor) in domain.iter().enumerate() {
            if processed.contains(&anchor) {
                continue;
            }
            let a = &prepared[anchor];
            let a_url = a.normalized_url.as_deref().unwrap_or_default();
            let mut members = vec![anchor];
            let mut best = 0.0f64;
            for &other in &domain[pos + 1..] {
                if processed.contains(&other) {
                    continue;
                }
                let b = &prepared[other];
                let url_sim = normalized_similarity(a_url, b.normalized_url.as_deref().unwrap_or_default());
                let title_sim = normalized_similarity(&a.record.title, &b.record.title);
                let title_term = if title_sim + SCORE_EPSILON >= title_threshold {
                    TITLE_WEIGHT * title_sim
                } else {
                    0.0
                };
                let combined = url_sim.max(title_term);
                if combined + SCORE_EPSILON >= url_threshold {
                    members.push(other);
                    processed.insert(other);
                    best = best.max(combined);
                }
            }
            if members.len() > 1 {
                processed.insert(anchor);
                let similarity = (best * 100.0).round().clamp(0.0, 100.0) as u8;
                groups.push(DuplicateGroup::new(ids(prepared, &members), similarity, DuplicateReason::SimilarUrl));
            }
        }
    }
    groups
}

fn fingerprint_stage(
    prepared: &[Prepared<'_>],
    processed: &mut HashSet<usize>,
    max_distance: u32,
) -> Vec<DuplicateGroup> {
    // Records with no usable tokens would all share the zero fingerprint.
    let mut candidates = Vec::new();
    let mut fingerprints = Vec::new();
    for (i, p) in prepared.iter().enumerate() {
        if processed.contains(&i) {
            continue;
        }
        let text = format!("{} {}", p.record.title, p.normalized_url.as_deref().unwrap_or_default());
        let tokens = tokenize(&text);
        if tokens.is_empty() {
            continue;
        }
        candidates.push(i);
        fingerprints.push(fingerprint_tokens(&tokens));
    }

    let pairs = find_similar_pairs(&fingerprints, max_distance);
    if pairs.is_empty() {
        return Vec::new();
    }
    let mut sets = DisjointSet::new();
    for pair in &pairs {
        sets.union(pair.i, pair.j);
    }
    let mut best: HashMap<usize, u8> = HashMap::new();
    for pair in &pairs {
        let root = sets.find(pair.i);
        let entry = best.entry(root).or_insert(0);
        *entry = (*entry).max(pair.similarity);
    }

    let mut groups = Vec::new();
    for cluster in sets.groups() {
        if cluster.len() < 2 {
            continue;
        }
        let members: Vec<usize> = cluster.iter().map(|&c| candidates[c]).collect();
        // A cluster touching an existing group is dropped whole. Candidates already
        // exclude processed records, so this cannot trigger on the current inputs.
        if members.iter().any(|m| processed.contains(m)) {
            tracing::debug!(size = members.len(), "dropping cluster overlapping earlier group");
            continue;
        }
        let similarity = best.get(&sets.find(cluster[0])).copied().unwrap_or(0);
        processed.extend(members.iter().copied());
        groups.push(DuplicateGroup::new(ids(prepared, &members), similarity, DuplicateReason::SimilarTitle));
    }
    groups
}

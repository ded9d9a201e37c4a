//! Prefix-bucket LSH over fingerprints.
//!
//! Fingerprints are grouped by the top 8 bits of their high word. Pairs are
//! compared inside a bucket and across neighbouring buckets (`key ± 1`), which
//! keeps the scan near O(N) when keys are spread out. If most fingerprints
//! share one prefix the scan degrades toward O(N^2).

use crate::fingerprint::{distance_to_similarity, Fingerprint};

/// Hamming distance accepted by default (roughly 90% similar).
pub const DEFAULT_DISTANCE_THRESHOLD: u32 = 6;
const BUCKETS: usize = 256;

/// Two fingerprint positions within `threshold` bits of each other. `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarPair {
    pub i: usize,
    pub j: usize,
    pub distance: u32,
    pub similarity: u8,
}

/// Positions of the input fingerprints grouped by bucket key.
#[derive(Debug, Clone)]
pub struct BucketIndex {
    buckets: Vec<Vec<usize>>,
}

impl BucketIndex {
    pub fn build(fingerprints: &[Fingerprint]) -> Self {
        let mut buckets = vec![Vec::new(); BUCKETS];
        for (idx, fp) in fingerprints.iter().enumerate() {
            buckets[fp.bucket_key() as usize].push(idx);
        }
        Self { buckets }
    }

    pub fn bucket(&self, key: u8) -> &[usize] {
        &self.buckets[key as usize]
    }

    pub fn occupied(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }

    /// Visit each candidate pair exactly once.
    ///
    /// Every bucket is paired with itself and with `key + 1`; the `key - 1`
    /// neighbour was already covered when that bucket looked forward.
    pub fn for_each_candidate(&self, mut visit: impl FnMut(usize, usize)) {
        for key in 0..BUCKETS {
            let here = &self.buckets[key];
            if here.is_empty() {
                continue;
            }
            for (a, &i) in here.iter().enumerate() {
                for &j in &here[a + 1..] {
                    visit(i.min(j), i.max(j));
                }
            }
            if let Some(next) = self.buckets.get(key + 1) {
                for &i in here {
                    for &j in next {
                        visit(i.min(j), i.max(j));
                    }
                }
            }
        }
    }
}

/// All pairs within `threshold` Hamming distance, most similar first.
pub fn find_similar_pairs(fingerprints: &[Fingerprint], threshold: u32) -> Vec<SimilarPair> {
    if fingerprints.len() < 2 {
        return Vec::new();
    }
    let index = BucketIndex::build(fingerprints);
    let mut compared = 0usize;
    let mut pairs = Vec::new();
    index.for_each_candidate(|i, j| {
        compared += 1;
        let distance = fingerprints[i].hamming_distance(&fingerprints[j]);
        if distance <= threshold {
            pairs.push(SimilarPair {
                i,
                j,
                distance,
                similarity: distance_to_similarity(distance),
            });
        }
    });
    pairs.sort_by(|a, b| {
        b.similarity
            .cmp(&a.similarity)
            .then(a.i.cmp(&b.i))
            .then(a.j.cmp(&b.j))
    });
    tracing::debug!(
        items = fingerprints.len(),
        buckets = index.occupied(),
        compared,
        accepted = pairs.len(),
        "lsh pair scan"
    );
    pairs
}

//! Near-duplicate detection for bookmarks and notes.
//!
//! Stages:
//! 1. Exact URL: normalized URL equality
//! 2. Similar URL: same host, Levenshtein similarity of URL and title
//! 3. Similar title: SimHash fingerprints, LSH pairs, union-find clusters

pub mod edit_distance;
pub mod merge;
pub mod pipeline;
pub mod union_find;
pub mod url_norm;

pub use edit_distance::{levenshtein, normalized_similarity};
pub use merge::MergeAction;
pub use pipeline::{find_duplicates, DuplicateGroup, DuplicatePipeline, DuplicateReason, DuplicateReport};
pub use union_find::DisjointSet;
pub use url_norm::{hostname, normalize_url};

#[cfg(test)]
mod tests;

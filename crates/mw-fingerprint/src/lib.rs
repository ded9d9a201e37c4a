//! Content fingerprints for markweave.
//!
//! - [`tokenizer`]: normalization, stop words, term frequency
//! - [`hash`]: the token mixing hash
//! - [`fingerprint`]: 64-bit SimHash plus its 16-char hex form
//! - [`lsh`]: bucketed candidate-pair search

pub mod fingerprint;
pub mod hash;
pub mod lsh;
pub mod tokenizer;

pub use fingerprint::{
    distance_to_similarity, fingerprint, fingerprint_to_hex, fingerprint_tokens,
    hamming_distance, hex_to_fingerprint, Fingerprint,
};
pub use lsh::{find_similar_pairs, BucketIndex, SimilarPair, DEFAULT_DISTANCE_THRESHOLD};
pub use tokenizer::tokenize;

//! Text normalization and token filtering.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

const MIN_TOKEN_LEN: usize = 2;
const MAX_TOKEN_LEN: usize = 30;

static RE_NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more",
    "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours", "http", "https", "www", "com", "org", "net", "html", "htm",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Whether `word` is in the fixed stop-word set.
pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Lowercase, replace anything that is not `[a-z0-9]` with whitespace, and keep
/// tokens of 2..=30 characters that are neither all digits nor stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE_NON_ALNUM
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|t| keep_token(t))
        .map(str::to_string)
        .collect()
}

fn keep_token(token: &str) -> bool {
    let len = token.len();
    if !(MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&len) {
        return false;
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    !is_stop_word(token)
}

/// Occurrence count per distinct token.
pub fn term_frequencies(tokens: &[String]) -> HashMap<&str, u32> {
    let mut tf: HashMap<&str, u32> = HashMap::with_capacity(tokens.len());
    for t in tokens {
        *tf.entry(t.as_str()).or_insert(0) += 1;
    }
    tf
}

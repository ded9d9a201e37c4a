//! Levenshtein distance with a single working row.

/// Edit distance over Unicode scalar values. Only the shorter string is
/// buffered, so working memory is O(min(len(a), len(b))).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    let short: Vec<char> = short.chars().collect();
    if short.is_empty() {
        return long.chars().count();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(lc != sc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diag + cost);
            diag = above;
        }
    }
    row[short.len()]
}

/// `1 - levenshtein / max_len` on lowercased input, in `[0, 1]`.
/// Two empty strings are identical.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

//! String comparison helpers shared by the distance model and the
//! grouping heuristics.
//!
//! Tag data is messy: inconsistent casing, stray whitespace, feature
//! credits appended to titles. Everything that compares two tag strings
//! funnels through here so the normalization rules stay in one place.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a trailing feature credit: " (feat. X)", " [ft. X]", " feat. X",
/// " featuring X". The metadata provider never carries these in track
/// titles, so they must not count against a title match.
static FEATURING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[(\[](?:feat|ft)\.?\s.*$|\s+(?:feat\.|ft\.|featuring)\s.*$")
        .expect("featuring regex is valid")
});

/// Lowercase and trim a tag value for comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Strip a trailing feature credit from a track title.
pub fn strip_featuring(title: &str) -> &str {
    match FEATURING.find(title) {
        Some(m) => title[..m.start()].trim_end(),
        None => title,
    }
}

/// Levenshtein edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // single-row DP
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let next = (prev + cost).min(row[j] + 1).min(row[j + 1] + 1);
            prev = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

/// Normalized similarity ratio in [0, 1]: 1.0 for identical strings,
/// 0.0 for completely different ones. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

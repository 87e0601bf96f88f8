//! Weighted distance accumulation for comparing local files against
//! catalog entities.
//!
//! A [`Distance`] collects normalized penalty contributions (0.0 = identical,
//! 1.0 = maximally different) under named categories. Each helper appends
//! penalties for one comparison shape (equality, booleans, numeric
//! tolerance, ratios, ranked preference, string similarity) and the final
//! [`Distance::normalized_distance`] folds everything into a single score
//! in [0, 1].
//!
//! Degenerate inputs have defined results rather than errors: a zero
//! denominator ratio is a zero penalty, and a distance with no penalties at
//! all normalizes to 0.0 (nothing compared means nothing mismatched).

pub mod munkres;

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::text;

/// Penalty values per category. Most categories only ever see a handful of
/// entries (the `tracks` category is the exception, one per mapped track).
type Penalties = SmallVec<[f64; 4]>;

/// Accumulator of normalized penalties across independent comparison axes.
#[derive(Debug, Clone, Default)]
pub struct Distance {
    penalties: BTreeMap<&'static str, Penalties>,
}

impl Distance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw penalty append. Callers guarantee `penalty` is within [0, 1].
    pub fn add(&mut self, category: &'static str, penalty: f64) {
        debug_assert!((0.0..=1.0).contains(&penalty), "penalty out of range: {penalty}");
        self.penalties.entry(category).or_default().push(penalty);
    }

    /// Full penalty when `penalized` holds, none otherwise.
    pub fn add_bool(&mut self, category: &'static str, penalized: bool) {
        self.add(category, if penalized { 1.0 } else { 0.0 });
    }

    /// No penalty when `value` is a member of `allowed`, full penalty
    /// otherwise.
    pub fn add_equality<S: AsRef<str>>(&mut self, category: &'static str, value: &str, allowed: &[S]) {
        let matched = allowed.iter().any(|a| a.as_ref() == value);
        self.add_bool(category, !matched);
    }

    /// Asymmetric numeric comparison: no penalty when equal, a deficit
    /// (`actual < expected`) ramps linearly up to the 1.0 cap, and any
    /// excess is an immediate full penalty. Too few of something is
    /// gradually bad; too many contradicts the data outright.
    pub fn add_number(&mut self, category: &'static str, actual: f64, expected: f64) {
        let diff = actual - expected;
        let penalty = if diff == 0.0 {
            0.0
        } else if diff < 0.0 {
            (-diff).min(1.0)
        } else {
            1.0
        };
        self.add(category, penalty);
    }

    /// Penalty proportional to `numerator / denominator`, clamped to [0, 1].
    /// A zero denominator contributes nothing.
    pub fn add_ratio(&mut self, category: &'static str, numerator: f64, denominator: f64) {
        let penalty = if denominator == 0.0 {
            0.0
        } else {
            (numerator / denominator).clamp(0.0, 1.0)
        };
        self.add(category, penalty);
    }

    /// Ranked preference: no penalty for the first entry of `preferred`,
    /// `index / len` for entries further down, full penalty for a
    /// non-member.
    pub fn add_priority<S: AsRef<str>>(&mut self, category: &'static str, value: &str, preferred: &[S]) {
        self.add(category, priority_penalty(value, preferred));
    }

    /// List-valued ranked preference: scores every candidate value and
    /// keeps the best (minimum) penalty. An empty candidate list is a full
    /// penalty.
    pub fn add_priority_list<S: AsRef<str>, T: AsRef<str>>(
        &mut self,
        category: &'static str,
        values: &[S],
        preferred: &[T],
    ) {
        let penalty = values
            .iter()
            .map(|v| priority_penalty(v.as_ref(), preferred))
            .fold(f64::INFINITY, f64::min);
        self.add(category, if penalty.is_finite() { penalty } else { 1.0 });
    }

    /// String similarity penalty: 0.0 for matching strings (both-empty
    /// included), 1.0 when one side is empty, otherwise one minus the
    /// normalized similarity ratio.
    pub fn add_string(&mut self, category: &'static str, a: &str, b: &str) {
        let a = text::normalize(a);
        let b = text::normalize(b);
        let penalty = if a.is_empty() && b.is_empty() {
            0.0
        } else if a.is_empty() || b.is_empty() {
            1.0
        } else {
            1.0 - text::similarity(&a, &b)
        };
        self.add(category, penalty);
    }

    /// The accumulated penalty map, keyed by category.
    pub fn penalties(&self) -> &BTreeMap<&'static str, Penalties> {
        &self.penalties
    }

    /// Sum of every penalty added.
    pub fn raw_distance(&self) -> f64 {
        self.penalties.values().flatten().sum()
    }

    /// Worst possible raw distance: each appended penalty contributes at
    /// most 1.0.
    pub fn max_distance(&self) -> f64 {
        self.penalties.values().map(|p| p.len() as f64).sum()
    }

    /// Overall dissimilarity in [0, 1]. A distance nothing was added to is
    /// a perfect match by definition.
    pub fn normalized_distance(&self) -> f64 {
        let max = self.max_distance();
        if max == 0.0 {
            0.0
        } else {
            self.raw_distance() / max
        }
    }
}

fn priority_penalty<S: AsRef<str>>(value: &str, preferred: &[S]) -> f64 {
    match preferred.iter().position(|p| p.as_ref() == value) {
        Some(index) => index as f64 / preferred.len() as f64,
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn penalties(dist: &Distance, category: &str) -> Vec<f64> {
        dist.penalties()
            .get(category)
            .map(|p| p.to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_add() {
        let mut dist = Distance::new();
        dist.add("add", 1.0);
        assert_eq!(penalties(&dist, "add"), vec![1.0]);
    }

    #[test]
    fn test_add_equality() {
        let mut dist = Distance::new();
        dist.add_equality("equality", "ghi", &["abc", "def", "ghi"]);
        dist.add_equality("equality", "xyz", &["abc", "def", "ghi"]);
        dist.add_equality("equality", "abc", &["abc", "def", "ghi"]);
        assert_eq!(penalties(&dist, "equality"), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_add_bool() {
        let mut dist = Distance::new();
        dist.add_bool("expr", true);
        dist.add_bool("expr", false);
        assert_eq!(penalties(&dist, "expr"), vec![1.0, 0.0]);
    }

    #[test]
    fn test_add_number_asymmetry() {
        // Deficits ramp to the cap, excesses max out immediately. This
        // shape is deliberate: missing data ranks above contradicted data.
        let mut dist = Distance::new();
        dist.add_number("number", 1.0, 1.0);
        dist.add_number("number", 1.0, 2.0);
        dist.add_number("number", 2.0, 1.0);
        dist.add_number("number", -1.0, 2.0);
        assert_eq!(penalties(&dist, "number"), vec![0.0, 1.0, 1.0, 1.0]);

        let mut dist = Distance::new();
        dist.add_number("number", 1.5, 2.0);
        assert_eq!(penalties(&dist, "number"), vec![0.5]);
    }

    #[test]
    fn test_add_priority_value() {
        let mut dist = Distance::new();
        dist.add_priority("priority", "abc", &["abc"]);
        dist.add_priority("priority", "def", &["abc", "def"]);
        dist.add_priority("priority", "xyz", &["abc", "def"]);
        assert_eq!(penalties(&dist, "priority"), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_add_priority_list() {
        let mut dist = Distance::new();
        dist.add_priority_list("priority", &["abc"], &["abc"]);
        dist.add_priority_list("priority", &["def"], &["abc"]);
        dist.add_priority_list("priority", &["abc", "xyz"], &["abc"]);
        dist.add_priority_list("priority", &["def", "xyz"], &["abc", "def"]);
        assert_eq!(penalties(&dist, "priority"), vec![0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_add_priority_list_empty() {
        let mut dist = Distance::new();
        let empty: [&str; 0] = [];
        dist.add_priority_list("priority", &empty, &["abc"]);
        assert_eq!(penalties(&dist, "priority"), vec![1.0]);
    }

    #[test]
    fn test_add_ratio() {
        let mut dist = Distance::new();
        dist.add_ratio("ratio", 25.0, 100.0);
        dist.add_ratio("ratio", 10.0, 5.0);
        dist.add_ratio("ratio", -5.0, 5.0);
        dist.add_ratio("ratio", 5.0, 0.0);
        assert_eq!(penalties(&dist, "ratio"), vec![0.25, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_add_string() {
        let mut dist = Distance::new();
        dist.add_string("string", "abcd", "bcde");
        assert_eq!(penalties(&dist, "string"), vec![0.5]);
    }

    #[test]
    fn test_add_string_one_empty() {
        let mut dist = Distance::new();
        dist.add_string("string", "", "bcd");
        assert_eq!(penalties(&dist, "string"), vec![1.0]);
    }

    #[test]
    fn test_add_string_both_empty() {
        let mut dist = Distance::new();
        dist.add_string("string", "", "");
        assert_eq!(penalties(&dist, "string"), vec![0.0]);
    }

    #[test]
    fn test_add_string_case_insensitive() {
        let mut dist = Distance::new();
        dist.add_string("string", "Some Title", "some title");
        assert_eq!(penalties(&dist, "string"), vec![0.0]);
    }

    #[test]
    fn test_normalized_distance() {
        let mut dist = Distance::new();
        dist.add("album", 0.5);
        dist.add("media_count", 0.25);
        dist.add("media_count", 0.75);
        assert_eq!(dist.normalized_distance(), 0.5);
    }

    #[test]
    fn test_max_distance() {
        let mut dist = Distance::new();
        dist.add("album", 0.5);
        dist.add("media_count", 0.0);
        dist.add("media_count", 0.0);
        // every appended penalty counts for 1.0 regardless of its value
        dist.add_string("artist", "abcd", "bcde");
        dist.add_string("title", "x", "x");
        assert_eq!(dist.max_distance(), 5.0);
    }

    #[test]
    fn test_raw_distance() {
        let mut dist = Distance::new();
        dist.add("album", 0.5);
        dist.add("media_count", 0.25);
        dist.add("media_count", 0.5);
        assert_eq!(dist.raw_distance(), 1.25);
    }

    #[test]
    fn test_empty_distance_is_perfect_match() {
        let dist = Distance::new();
        assert_eq!(dist.max_distance(), 0.0);
        assert_eq!(dist.normalized_distance(), 0.0);
    }
}

//! Per-field similarity functions
//!
//! All functions return a similarity in `[0.0, 1.0]` and are symmetric in
//! their arguments. A missing value on either side is never similar.

use crate::schema::Comparator;
use ahash::AHashSet;
use filmx_core::split_values;

impl Comparator {
    /// Compare two (possibly missing) cell texts
    pub fn similarity(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        let (Some(a), Some(b)) = (a, b) else {
            return 0.0;
        };
        match self {
            Comparator::Exact => exact_similarity(a, b),
            Comparator::Jaccard => jaccard_similarity(a, b),
            Comparator::AnyOverlap => overlap_similarity(a, b),
        }
    }
}

/// 1.0 when the texts are identical (case-sensitive)
pub fn exact_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

/// Jaccard index of the comma-separated token sets
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = token_set(a);
    let tokens_b = token_set(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    intersection as f64 / union as f64
}

/// 1.0 when the comma-separated token sets share at least one token
pub fn overlap_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = token_set(a);
    if split_values(b).any(|t| tokens_a.contains(t)) {
        1.0
    } else {
        0.0
    }
}

/// Distinct trimmed, non-empty tokens of a multi-valued cell
pub fn token_set(raw: &str) -> AHashSet<&str> {
    split_values(raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_similarity() {
        assert_eq!(exact_similarity("George Lucas", "George Lucas"), 1.0);
        assert_eq!(exact_similarity("George Lucas", "george lucas"), 0.0);
    }

    #[test]
    fn test_jaccard_similarity() {
        assert_eq!(jaccard_similarity("Action, Adventure", "Adventure,Action"), 1.0);
        let sim = jaccard_similarity("Action, Adventure", "Action, Drama");
        assert!((sim - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard_similarity("Action", "Comedy"), 0.0);
        assert_eq!(jaccard_similarity(" , ", "Comedy"), 0.0);
    }

    #[test]
    fn test_overlap_similarity_is_binary() {
        assert_eq!(overlap_similarity("Mark Hamill, Harrison Ford", "Harrison Ford, Sean Connery"), 1.0);
        assert_eq!(overlap_similarity("Mark Hamill", "Sean Connery"), 0.0);
        assert_eq!(overlap_similarity("", "Sean Connery"), 0.0);
    }

    #[test]
    fn test_missing_values_score_zero() {
        for comparator in [Comparator::Exact, Comparator::Jaccard, Comparator::AnyOverlap] {
            assert_eq!(comparator.similarity(None, Some("x")), 0.0);
            assert_eq!(comparator.similarity(Some("x"), None), 0.0);
            assert_eq!(comparator.similarity(None, None), 0.0);
        }
    }

    #[test]
    fn test_comparators_are_symmetric() {
        let pairs = [
            ("Action, Adventure, Fantasy", "Fantasy, Horror"),
            ("A", "A, B, C"),
            ("", "A"),
        ];
        for comparator in [Comparator::Exact, Comparator::Jaccard, Comparator::AnyOverlap] {
            for (a, b) in pairs {
                assert_eq!(
                    comparator.similarity(Some(a), Some(b)),
                    comparator.similarity(Some(b), Some(a))
                );
            }
        }
    }
}

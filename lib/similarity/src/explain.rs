//! Explainability for similarity results
//!
//! Per-field score breakdowns and summary statistics for a ranking.

use crate::scorer::SimilarityResult;
use serde::Serialize;

/// Weighted contribution of one field to a pair score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldScore {
    pub field: String,
    pub score: f64,
}

/// Summary statistics for a similarity query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityStats {
    /// Number of candidates considered
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average score of results
    pub avg_score: f64,
    /// Score of best result
    pub best_score: f64,
}

impl SimilarityStats {
    /// Compute stats from ranked results (best first)
    pub fn compute(results: &[SimilarityResult], candidates_count: usize) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
            };
        }

        let total: f64 = results.iter().map(|r| r.similarity).sum();
        Self {
            candidates_count,
            results_count: results.len(),
            avg_score: total / results.len() as f64,
            best_score: results[0].similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: i64, similarity: f64) -> SimilarityResult {
        SimilarityResult {
            id,
            title: None,
            director: None,
            genres: None,
            similarity,
        }
    }

    #[test]
    fn test_stats() {
        let stats = SimilarityStats::compute(&[result(1, 75.0), result(2, 25.0)], 9);
        assert_eq!(stats.candidates_count, 9);
        assert_eq!(stats.results_count, 2);
        assert_eq!(stats.avg_score, 50.0);
        assert_eq!(stats.best_score, 75.0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = SimilarityStats::compute(&[], 3);
        assert_eq!(stats.results_count, 0);
        assert_eq!(stats.best_score, 0.0);
    }
}

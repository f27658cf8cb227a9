//! Weighted multi-field similarity between records
//!
//! Scores every candidate of a record set against a target record and ranks
//! the ones that reach a threshold.

use crate::explain::FieldScore;
use crate::schema::{SchemaError, SimilaritySchema, DIRECTOR_FIELD, GENRES_FIELD, TITLE_FIELD};
use ahash::AHashSet;
use filmx_core::{Error, RecordSet, RecordView, Result, ID_COLUMN};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::info;

/// One ranked neighbor of a target record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub id: i64,
    pub title: Option<String>,
    pub director: Option<String>,
    pub genres: Option<String>,
    pub similarity: f64,
}

impl SimilarityResult {
    fn from_record(record: &RecordView<'_>, id: i64, similarity: f64) -> Self {
        Self {
            id,
            title: record.text(TITLE_FIELD).map(str::to_string),
            director: record.text(DIRECTOR_FIELD).map(str::to_string),
            genres: record.text(GENRES_FIELD).map(str::to_string),
            similarity,
        }
    }
}

/// Computes structured similarity scores between records
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    schema: SimilaritySchema,
}

impl SimilarityScorer {
    /// Create a scorer, validating the schema
    pub fn new(schema: SimilaritySchema) -> std::result::Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Self { schema })
    }

    /// Scorer for the default film schema with the given category weight
    pub fn films(weight: f64) -> std::result::Result<Self, SchemaError> {
        Self::new(SimilaritySchema::films(weight))
    }

    pub fn schema(&self) -> &SimilaritySchema {
        &self.schema
    }

    /// Weighted sum of the per-field similarities of `a` and `b`.
    ///
    /// Symmetric, in `[0, schema.max_score()]`.
    pub fn score(&self, a: &RecordView<'_>, b: &RecordView<'_>) -> f64 {
        self.schema
            .fields
            .iter()
            .map(|field| field.weight * self.field_similarity(a, b, &field.name, field.comparator))
            .sum()
    }

    /// Per-field weighted contributions, in schema order
    pub fn explain(&self, a: &RecordView<'_>, b: &RecordView<'_>) -> Vec<FieldScore> {
        self.schema
            .fields
            .iter()
            .map(|field| FieldScore {
                field: field.name.clone(),
                score: field.weight * self.field_similarity(a, b, &field.name, field.comparator),
            })
            .collect()
    }

    fn field_similarity(
        &self,
        a: &RecordView<'_>,
        b: &RecordView<'_>,
        name: &str,
        comparator: crate::schema::Comparator,
    ) -> f64 {
        let left = a.get(name).and_then(|v| v.render());
        let right = b.get(name).and_then(|v| v.render());
        comparator.similarity(left.as_deref(), right.as_deref())
    }

    /// Records of `records` at least `threshold` similar to the record with
    /// id `target_id`, most similar first.
    ///
    /// The target itself is excluded. Equal scores keep the relative order
    /// they have in `records`.
    pub fn find_similar(
        &self,
        records: &RecordSet,
        target_id: i64,
        threshold: f64,
    ) -> Result<Vec<SimilarityResult>> {
        records.require_column(ID_COLUMN)?;
        let target = records
            .find_by_id(target_id)
            .ok_or(Error::NotFound(target_id))?;

        info!(
            target_id,
            title = target.text(TITLE_FIELD).unwrap_or_default(),
            threshold,
            "Finding similar films"
        );

        let scored: Vec<(usize, i64, f64)> = (0..records.len())
            .into_par_iter()
            .filter_map(|row| {
                let candidate = records.row(row)?;
                let id = candidate.id()?;
                if id == target_id {
                    return None;
                }
                let score = self.score(&target, &candidate);
                (score >= threshold).then_some((row, id, score))
            })
            .collect();

        let mut seen = AHashSet::with_capacity(scored.len());
        let mut results: Vec<SimilarityResult> = scored
            .into_iter()
            .filter(|(_, id, _)| seen.insert(*id))
            .filter_map(|(row, id, score)| {
                records
                    .row(row)
                    .map(|record| SimilarityResult::from_record(&record, id, score))
            })
            .collect();

        // Stable: ties stay in input order
        results.sort_by_key(|r| Reverse(OrderedFloat(r.similarity)));

        if results.is_empty() {
            info!("No similar films found");
        } else {
            info!(count = results.len(), "Found similar films");
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmx_core::Column;

    fn films() -> RecordSet {
        RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1), Some(2), Some(3), Some(4)]),
            Column::text(
                "title",
                vec![Some("Star Wars"), Some("Empire"), Some("Jaws"), Some("Alien"), Some("Ghost")],
            ),
            Column::text(
                "director",
                vec![
                    Some("George Lucas"),
                    Some("Irvin Kershner"),
                    Some("Steven Spielberg"),
                    Some("Ridley Scott"),
                    None,
                ],
            ),
            Column::text(
                "genres",
                vec![
                    Some("Action, Adventure, Fantasy"),
                    Some("Action, Adventure, Fantasy"),
                    Some("Thriller"),
                    Some("Horror, Sci-Fi"),
                    None,
                ],
            ),
            Column::text(
                "cast",
                vec![
                    Some("Mark Hamill, Harrison Ford"),
                    Some("Harrison Ford, Carrie Fisher"),
                    Some("Roy Scheider"),
                    Some("Sigourney Weaver"),
                    None,
                ],
            ),
            Column::text(
                "country",
                vec![
                    Some("United States"),
                    Some("United States"),
                    Some("United States"),
                    Some("United Kingdom"),
                    None,
                ],
            ),
        ])
        .unwrap()
    }

    fn scorer() -> SimilarityScorer {
        SimilarityScorer::films(25.0).unwrap()
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        let records = films();
        let star_wars = records.row(0).unwrap();
        assert_eq!(scorer().score(&star_wars, &star_wars), 100.0);
    }

    #[test]
    fn test_score_components() {
        let records = films();
        let a = records.row(0).unwrap();
        let b = records.row(1).unwrap();
        // genres + cast + country
        assert_eq!(scorer().score(&a, &b), 75.0);

        let explained = scorer().explain(&a, &b);
        let fields: Vec<_> = explained.iter().map(|f| (f.field.as_str(), f.score)).collect();
        assert_eq!(
            fields,
            vec![("director", 0.0), ("genres", 25.0), ("cast", 25.0), ("country", 25.0)]
        );
    }

    #[test]
    fn test_score_is_symmetric() {
        let records = films();
        let scorer = scorer();
        for a in records.rows() {
            for b in records.rows() {
                assert_eq!(scorer.score(&a, &b), scorer.score(&b, &a));
            }
        }
    }

    #[test]
    fn test_nulls_score_zero() {
        let records = films();
        let ghost = records.row(4).unwrap();
        assert_eq!(scorer().score(&ghost, &ghost), 0.0);
        assert_eq!(scorer().score(&records.row(0).unwrap(), &ghost), 0.0);
    }

    #[test]
    fn test_find_similar_ranking() {
        let records = films();
        let results = scorer().find_similar(&records, 0, 25.0).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        // Empire 75, Jaws 25 (country)
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(results[0].similarity, 75.0);
        assert_eq!(results[0].title.as_deref(), Some("Empire"));
        assert_eq!(results[0].director.as_deref(), Some("Irvin Kershner"));
        assert_eq!(results[0].genres.as_deref(), Some("Action, Adventure, Fantasy"));
    }

    #[test]
    fn test_find_similar_excludes_target() {
        let records = films();
        for target in 0..5 {
            let results = scorer().find_similar(&records, target, 0.0).unwrap();
            assert!(results.iter().all(|r| r.id != target));
        }
    }

    #[test]
    fn test_threshold_zero_returns_all_others() {
        let records = films();
        let results = scorer().find_similar(&records, 3, 0.0).unwrap();
        assert_eq!(results.len(), records.len() - 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = films();
        // Alien shares nothing with the others: every candidate ties at 0
        let results = scorer().find_similar(&records, 3, 0.0).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let records = films();
        let results = scorer().find_similar(&records, 0, 75.0).unwrap();
        assert_eq!(results.len(), 1);
        let none = scorer().find_similar(&records, 0, 75.5).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_unknown_target() {
        let result = scorer().find_similar(&films(), 42, 50.0);
        assert!(matches!(result, Err(Error::NotFound(42))));
    }

    #[test]
    fn test_custom_weight() {
        let records = films();
        let scorer = SimilarityScorer::films(10.0).unwrap();
        let a = records.row(0).unwrap();
        assert_eq!(scorer.score(&a, &a), 40.0);
    }
}

//! Query entry points over a stored films table

use crate::{FilterSpec, PredicateFilterEngine, RecordSet, Result};
use filmx_similarity::{SimilarityResult, SimilarityScorer, SimilaritySchema, SimilarityStats};
use filmx_storage::load_table;
use std::path::Path;
use tracing::info;

/// Load the table at `data_path` and keep the rows matching every filter
pub fn query_films<P: AsRef<Path>>(data_path: P, spec: &FilterSpec) -> Result<RecordSet> {
    let films = load_table(data_path)?;
    let result = PredicateFilterEngine::new().apply_all(&films, spec)?;
    info!(filters = spec.len(), matched = result.len(), "Query completed");
    Ok(result)
}

/// Films of the table at `data_path` at least `threshold` similar to `film_id`
pub fn find_similar_films<P: AsRef<Path>>(
    film_id: i64,
    threshold: f64,
    data_path: P,
    schema: &SimilaritySchema,
) -> Result<Vec<SimilarityResult>> {
    find_similar_with_stats(film_id, threshold, data_path, schema).map(|(results, _)| results)
}

/// Like [`find_similar_films`], also summarising the ranking
pub fn find_similar_with_stats<P: AsRef<Path>>(
    film_id: i64,
    threshold: f64,
    data_path: P,
    schema: &SimilaritySchema,
) -> Result<(Vec<SimilarityResult>, SimilarityStats)> {
    let scorer = SimilarityScorer::new(schema.clone())?;
    let films = load_table(data_path)?;
    let results = scorer.find_similar(&films, film_id, threshold)?;
    let stats = SimilarityStats::compute(&results, films.len().saturating_sub(1));
    Ok((results, stats))
}

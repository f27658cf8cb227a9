//! # filmx
//!
//! A columnar film data engine.
//!
//! filmx turns a raw film CSV into a typed, columnar table, splits it into
//! per-genre partitions, and answers predicate and similarity queries over it.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! filmx run --input resources/csv/allFilms.csv --schema resources/json/allFilesSchema.json
//! filmx query --filter '{"durationMins": {"range": [100, 160]}, "title": {"substring": "Star"}}'
//! filmx similar --id 0 --threshold 50
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use filmx::prelude::*;
//!
//! let config = FilmxConfig::default();
//! Pipeline::films(&config).run().unwrap();
//!
//! let spec = FilterSpec::from_json_str(r#"{"director": "George Lucas"}"#).unwrap();
//! let films = query_films(config.films_path(), &spec).unwrap();
//!
//! let similar =
//!     find_similar_films(0, 50.0, config.films_path(), &SimilaritySchema::default()).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `filmx-core` - Record model, schema coercion, partitioning, filtering
//! - `filmx-similarity` - Weighted multi-field similarity scoring
//! - `filmx-storage` - CSV and schema sources, table files, partition artifacts

pub mod pipeline;
pub mod query;

// Re-export core types
pub use filmx_core::{
    CategoryPartitioner, CoercionConfig, Column, ColumnData, Condition, Error, FieldSchema,
    FieldType, FilmxConfig, Filter, FilterSpec, MembershipMode, Partition, PartitionConfig,
    PredicateFilterEngine, RawTable, RecordSet, RecordView, Result, RowErrorPolicy,
    SchemaCoercer, Value, DEFAULT_CATEGORY_WEIGHT,
};

// Re-export similarity
pub use filmx_similarity::{
    Comparator, FieldConfig, SimilarityResult, SimilarityScorer, SimilaritySchema,
    SimilarityStats,
};

// Re-export storage
pub use filmx_storage::{PartitionStore, StorageManager};

pub use pipeline::{Pipeline, PipelineReport, Stage};
pub use query::{find_similar_films, find_similar_with_stats, query_films};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        find_similar_films, query_films, Condition, Error, FilmxConfig, FilterSpec, Pipeline,
        PredicateFilterEngine, RecordSet, Result, SimilarityScorer, SimilaritySchema,
        StorageManager, Value,
    };
}

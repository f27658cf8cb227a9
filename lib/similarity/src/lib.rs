//! # filmx Similarity
//!
//! A schema-driven similarity engine for film records.
//!
//! ## Features
//!
//! - **Similarity Schema**: Declarative list of scored fields, comparators and weights
//! - **Comparators**: Exact match, Jaccard index over tokens, binary token overlap
//! - **Ranking**: Threshold filtering with stable, deterministic ordering
//! - **Explainability**: Per-field contribution breakdown
//!
//! ## Example
//!
//! ```rust
//! use filmx_core::{Column, RecordSet};
//! use filmx_similarity::SimilarityScorer;
//!
//! let films = RecordSet::new(vec![
//!     Column::int("id", vec![Some(0), Some(1)]),
//!     Column::text("director", vec![Some("George Lucas"), Some("George Lucas")]),
//!     Column::text("genres", vec![Some("Action, Adventure"), Some("Action")]),
//! ]).unwrap();
//!
//! let scorer = SimilarityScorer::films(25.0).unwrap();
//! let similar = scorer.find_similar(&films, 0, 30.0).unwrap();
//! assert_eq!(similar[0].id, 1);
//! assert_eq!(similar[0].similarity, 37.5);
//! ```

pub mod distance;
pub mod explain;
pub mod schema;
pub mod scorer;

pub use explain::{FieldScore, SimilarityStats};
pub use schema::{Comparator, FieldConfig, SchemaError, SimilaritySchema};
pub use scorer::{SimilarityResult, SimilarityScorer};

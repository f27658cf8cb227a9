//! Similarity Schema definitions
//!
//! Declares which record fields take part in similarity scoring, how each
//! one is compared and how much it weighs. The total score of a pair is the
//! sum of the weighted per-field similarities.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DIRECTOR_FIELD: &str = "director";
pub const GENRES_FIELD: &str = "genres";
pub const CAST_FIELD: &str = "cast";
pub const COUNTRY_FIELD: &str = "country";
pub const TITLE_FIELD: &str = "title";

/// Similarity schema version 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilaritySchema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Scored fields, in evaluation order
    pub fields: Vec<FieldConfig>,
}

fn default_version() -> u32 {
    1
}

impl SimilaritySchema {
    pub fn new(fields: Vec<FieldConfig>) -> Self {
        Self { version: 1, fields }
    }

    /// The film comparison schema: director, genres, cast and country, each
    /// worth `weight` when it matches fully.
    pub fn films(weight: f64) -> Self {
        Self::new(vec![
            FieldConfig::exact(DIRECTOR_FIELD, weight),
            FieldConfig::jaccard(GENRES_FIELD, weight),
            FieldConfig::any_overlap(CAST_FIELD, weight),
            FieldConfig::exact(COUNTRY_FIELD, weight),
        ])
    }

    /// Validate the schema
    /// - At least one field
    /// - Unique field names
    /// - Finite, non-negative weights
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        for (i, config) in self.fields.iter().enumerate() {
            if !config.weight.is_finite() || config.weight < 0.0 {
                return Err(SchemaError::NegativeWeight(config.name.clone()));
            }
            if self.fields[..i].iter().any(|f| f.name == config.name) {
                return Err(SchemaError::DuplicateField(config.name.clone()));
            }
        }

        Ok(())
    }

    /// Highest reachable score (every field fully similar)
    pub fn max_score(&self) -> f64 {
        self.fields.iter().map(|f| f.weight).sum()
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Copy of the schema with some weights replaced.
    ///
    /// Unknown field names are ignored; negative weights clamp to zero.
    pub fn with_weights(&self, overrides: &HashMap<String, f64>) -> Self {
        let mut modified = self.clone();
        for field in &mut modified.fields {
            if let Some(weight) = overrides.get(&field.name) {
                field.weight = weight.max(0.0);
            }
        }
        modified
    }
}

impl Default for SimilaritySchema {
    fn default() -> Self {
        Self::films(filmx_core::DEFAULT_CATEGORY_WEIGHT)
    }
}

/// Configuration for a single scored field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    pub name: String,

    #[serde(default)]
    pub comparator: Comparator,

    /// Contribution of this field when it is fully similar
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    filmx_core::DEFAULT_CATEGORY_WEIGHT
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, comparator: Comparator, weight: f64) -> Self {
        Self {
            name: name.into(),
            comparator,
            weight,
        }
    }

    pub fn exact(name: impl Into<String>, weight: f64) -> Self {
        Self::new(name, Comparator::Exact, weight)
    }

    pub fn jaccard(name: impl Into<String>, weight: f64) -> Self {
        Self::new(name, Comparator::Jaccard, weight)
    }

    pub fn any_overlap(name: impl Into<String>, weight: f64) -> Self {
        Self::new(name, Comparator::AnyOverlap, weight)
    }
}

/// How two cells of a field are compared
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// 1 if both present and equal, 0 otherwise
    #[default]
    Exact,
    /// Jaccard index of the comma-separated token sets
    Jaccard,
    /// 1 if the comma-separated token sets share any token
    AnyOverlap,
}

/// Errors that can occur during schema validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema cannot be empty")]
    EmptySchema,

    #[error("Field '{0}' has a negative or non-finite weight")]
    NegativeWeight(String),

    #[error("Field '{0}' is declared twice")]
    DuplicateField(String),
}

impl From<SchemaError> for filmx_core::Error {
    fn from(e: SchemaError) -> Self {
        filmx_core::Error::InvalidConfig(e.to_string())
    }
}

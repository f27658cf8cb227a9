use crate::coerce::RowErrorPolicy;
use crate::partition::MembershipMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contribution of one similarity category when it matches fully
pub const DEFAULT_CATEGORY_WEIGHT: f64 = 25.0;

/// Column the genre partitions are keyed on
pub const DEFAULT_CATEGORY_COLUMN: &str = "genres";

/// Engine-wide configuration, passed explicitly to each component
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmxConfig {
    /// Raw CSV input
    pub input_csv: PathBuf,
    /// JSON field schema
    pub schema_path: PathBuf,
    /// Root of every generated artifact
    pub data_dir: PathBuf,
    /// Typed films table, relative to `data_dir` unless absolute
    pub films_file: PathBuf,
    /// Partition artifact directory, relative to `data_dir` unless absolute
    pub genres_dir: PathBuf,
    pub category_column: String,
    pub category_weight: f64,
    #[serde(default)]
    pub membership: MembershipMode,
    #[serde(default)]
    pub row_errors: RowErrorPolicy,
}

impl Default for FilmxConfig {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::from("resources/csv/allFilms.csv"),
            schema_path: PathBuf::from("resources/json/allFilesSchema.json"),
            data_dir: PathBuf::from("output"),
            films_file: PathBuf::from("films.fxt"),
            genres_dir: PathBuf::from("genres"),
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            category_weight: DEFAULT_CATEGORY_WEIGHT,
            membership: MembershipMode::default(),
            row_errors: RowErrorPolicy::default(),
        }
    }
}

impl FilmxConfig {
    pub fn films_path(&self) -> PathBuf {
        self.data_dir.join(&self.films_file)
    }

    pub fn genres_path(&self) -> PathBuf {
        self.data_dir.join(&self.genres_dir)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.category_weight.is_finite() || self.category_weight < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "category weight must be a non-negative number, got {}",
                self.category_weight
            )));
        }
        if self.category_column.is_empty() {
            return Err(Error::InvalidConfig("category column is empty".to_string()));
        }
        Ok(())
    }
}

//! Batch pipeline: ingest the raw CSV into a typed table, then split it by
//! genre.
//!
//! Each stage declares the artifact it produces. A stage whose artifact is
//! already on disk is skipped unless the pipeline is forced, so a rerun only
//! does the missing work.

use crate::{
    CategoryPartitioner, CoercionConfig, FilmxConfig, PartitionConfig, Result, SchemaCoercer,
};
use filmx_storage::{load_csv, load_field_schema, StorageManager, SUCCESS_MARKER};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// One unit of pipeline work
pub trait Stage {
    fn name(&self) -> &str;

    /// Artifact whose presence marks the stage as done
    fn output(&self) -> PathBuf;

    fn run(&self) -> Result<()>;

    fn is_complete(&self) -> bool {
        self.output().exists()
    }
}

/// Raw CSV + field schema -> typed films table
pub struct IngestStage {
    config: FilmxConfig,
}

impl IngestStage {
    pub fn new(config: FilmxConfig) -> Self {
        Self { config }
    }
}

impl Stage for IngestStage {
    fn name(&self) -> &str {
        "ingest"
    }

    fn output(&self) -> PathBuf {
        self.config.films_path()
    }

    fn run(&self) -> Result<()> {
        let raw = load_csv(&self.config.input_csv)?;
        let schema = load_field_schema(&self.config.schema_path)?;

        let coercer = SchemaCoercer::new(CoercionConfig {
            row_errors: self.config.row_errors,
        });
        let films = coercer.coerce(&raw, &schema)?;

        StorageManager::from_config(&self.config)?.save_films(&films)
    }
}

/// Films table -> one partition artifact per genre
pub struct SplitByGenreStage {
    config: FilmxConfig,
}

impl SplitByGenreStage {
    pub fn new(config: FilmxConfig) -> Self {
        Self { config }
    }
}

impl Stage for SplitByGenreStage {
    fn name(&self) -> &str {
        "split_by_genre"
    }

    fn output(&self) -> PathBuf {
        self.config.genres_path().join(SUCCESS_MARKER)
    }

    fn run(&self) -> Result<()> {
        let storage = StorageManager::from_config(&self.config)?;
        let films = storage.load_films()?;

        let partitioner = CategoryPartitioner::new(PartitionConfig {
            membership: self.config.membership,
        });
        let partitions = partitioner.partition(&films, &self.config.category_column)?;
        storage.save_partitions(&partitions)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ran,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: String,
    pub output: PathBuf,
    pub status: StageStatus,
}

/// What a pipeline run did, in stage order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageOutcome>,
}

impl PipelineReport {
    pub fn ran(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Ran)
            .map(|s| s.stage.as_str())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Skipped)
            .map(|s| s.stage.as_str())
    }
}

/// Ordered list of stages; each stage depends on the ones before it
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    force: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            force: false,
        }
    }

    /// Ingest followed by the genre split
    pub fn films(config: &FilmxConfig) -> Self {
        Self::new()
            .stage(IngestStage::new(config.clone()))
            .stage(SplitByGenreStage::new(config.clone()))
    }

    pub fn stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Rerun every stage even when its output exists
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the stages in order, stopping at the first failure.
    ///
    /// Once a stage runs, every later stage runs too, since its input changed.
    pub fn run(&self) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();
        let mut upstream_ran = false;

        for stage in &self.stages {
            let output = stage.output();
            if !self.force && !upstream_ran && stage.is_complete() {
                info!(stage = stage.name(), "Output {:?} exists, skipping", output);
                report.stages.push(StageOutcome {
                    stage: stage.name().to_string(),
                    output,
                    status: StageStatus::Skipped,
                });
                continue;
            }

            info!(stage = stage.name(), "Running stage");
            if let Err(e) = stage.run() {
                warn!(stage = stage.name(), "Stage failed: {}", e);
                return Err(e);
            }
            upstream_ran = true;
            report.stages.push(StageOutcome {
                stage: stage.name().to_string(),
                output,
                status: StageStatus::Ran,
            });
        }

        Ok(report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

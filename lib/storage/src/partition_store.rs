// Partition artifacts: one table file per category token plus a completion marker
use crate::table::{read_table, write_table, TABLE_EXTENSION};
use anyhow::{bail, Result};
use filmx_core::{artifact_name, Partition, RecordSet};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker written once every partition artifact is on disk
pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub struct PartitionStore {
    dir: PathBuf,
}

impl PartitionStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(SUCCESS_MARKER)
    }

    /// Path of the artifact for a category token
    pub fn artifact_path(&self, token: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", artifact_name(token), TABLE_EXTENSION))
    }

    /// Whether a previous run wrote every artifact
    pub fn is_complete(&self) -> bool {
        self.marker_path().is_file()
    }

    /// Write every partition, then the completion marker.
    ///
    /// The directory is created if needed. Any existing marker is removed
    /// first so an interrupted run is never reported complete.
    pub fn write_all(&self, partitions: &[Partition]) -> Result<Vec<PathBuf>> {
        info!("Creating directory if not exists: {:?}", self.dir);
        fs::create_dir_all(&self.dir)?;

        let marker = self.marker_path();
        if marker.exists() {
            fs::remove_file(&marker)?;
        }

        // Distinct tokens must not share an artifact file
        let mut names: HashMap<String, &str> = HashMap::with_capacity(partitions.len());
        for partition in partitions {
            if let Some(other) = names.insert(partition.artifact_name(), &partition.token) {
                bail!(
                    "categories {:?} and {:?} map to the same artifact {:?}",
                    other,
                    partition.token,
                    partition.artifact_name()
                );
            }
        }

        let mut written = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let path = self.artifact_path(&partition.token);
            write_table(&path, &partition.records)?;
            debug!("Wrote {} films to {:?}", partition.len(), path);
            written.push(path);
        }

        fs::write(&marker, "Complete")?;
        info!("Split by genre completed, wrote {} files", written.len());
        Ok(written)
    }

    /// Artifact names present on disk, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some(TABLE_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read back the partition of a category token
    pub fn read(&self, token: &str) -> Result<RecordSet> {
        read_table(self.artifact_path(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmx_core::{CategoryPartitioner, Column};

    fn films() -> RecordSet {
        RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1), Some(2)]),
            Column::text(
                "genres",
                vec![Some("Action, Adventure"), Some("Science Fiction"), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_write_all_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = PartitionStore::new(dir.path().join("genres"));
        let partitions = CategoryPartitioner::default()
            .partition(&films(), "genres")
            .unwrap();

        assert!(!store.is_complete());
        let written = store.write_all(&partitions).unwrap();
        assert_eq!(written.len(), 3);
        assert!(store.is_complete());
        assert_eq!(
            fs::read_to_string(store.marker_path()).unwrap(),
            "Complete"
        );
        assert_eq!(
            store.list().unwrap(),
            vec!["Action", "Adventure", "Science_Fiction"]
        );

        let scifi = store.read("Science Fiction").unwrap();
        assert_eq!(scifi.len(), 1);
        assert_eq!(scifi.row(0).unwrap().id(), Some(1));
    }

    #[test]
    fn test_write_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PartitionStore::new(dir.path());
        let partitions = CategoryPartitioner::default()
            .partition(&films(), "genres")
            .unwrap();

        store.write_all(&partitions).unwrap();
        store.write_all(&partitions).unwrap();
        assert_eq!(store.list().unwrap().len(), 3);
        assert!(store.is_complete());
    }

    #[test]
    fn test_artifacts_stay_in_partition_dir() {
        let dir = tempfile::tempdir().unwrap();
        let genres = dir.path().join("genres");
        let store = PartitionStore::new(&genres);
        let records = RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1), Some(2)]),
            Column::text("genres", vec![Some("Sci-Fi/Fantasy"), Some("Drama"), Some("..")]),
        ])
        .unwrap();
        let partitioner = CategoryPartitioner::default();
        let tokens = partitioner.distinct_tokens(&records, "genres").unwrap();
        let partitions = partitioner.partition(&records, "genres").unwrap();

        let written = store.write_all(&partitions).unwrap();
        assert!(written.iter().all(|p| p.parent() == Some(genres.as_path())));
        assert_eq!(store.list().unwrap().len(), tokens.len());
        assert_eq!(store.list().unwrap(), vec!["Drama", "Sci-Fi_Fantasy", "__"]);
        assert_eq!(store.read("Sci-Fi/Fantasy").unwrap().row(0).unwrap().id(), Some(0));
        assert_eq!(store.read("..").unwrap().row(0).unwrap().id(), Some(2));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_colliding_artifact_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = PartitionStore::new(dir.path());
        let records = RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1)]),
            Column::text("genres", vec![Some("Sci-Fi/Fantasy"), Some("Sci-Fi_Fantasy")]),
        ])
        .unwrap();
        let partitions = CategoryPartitioner::default()
            .partition(&records, "genres")
            .unwrap();

        assert!(store.write_all(&partitions).is_err());
        assert!(!store.is_complete());
    }

    #[test]
    fn test_list_missing_dir() {
        let store = PartitionStore::new("/nonexistent/genres");
        assert!(store.list().unwrap().is_empty());
        assert!(!store.is_complete());
    }
}

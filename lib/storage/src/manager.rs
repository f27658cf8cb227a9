use crate::partition_store::PartitionStore;
use crate::source::{load_schema, read_csv};
use crate::table::{read_table, write_table};
use filmx_core::{Error, FieldSchema, FilmxConfig, Partition, RawTable, RecordSet, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Owns the on-disk layout of a data directory: the films table and the
/// genre partition directory.
pub struct StorageManager {
    data_dir: PathBuf,
    films_path: PathBuf,
    genres_dir: PathBuf,
}

impl StorageManager {
    /// Default layout (`films.fxt`, `genres/`) under `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let config = FilmxConfig {
            data_dir,
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &FilmxConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            data_dir: config.data_dir.clone(),
            films_path: config.films_path(),
            genres_dir: config.genres_path(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn films_path(&self) -> &Path {
        &self.films_path
    }

    pub fn genres_dir(&self) -> &Path {
        &self.genres_dir
    }

    pub fn has_films(&self) -> bool {
        self.films_path.is_file()
    }

    pub fn save_films(&self, records: &RecordSet) -> Result<()> {
        write_table(&self.films_path, records).map_err(storage_error)?;
        info!("Wrote {} rows to {:?}", records.len(), self.films_path);
        Ok(())
    }

    pub fn load_films(&self) -> Result<RecordSet> {
        load_table(&self.films_path)
    }

    pub fn partitions(&self) -> PartitionStore {
        PartitionStore::new(&self.genres_dir)
    }

    pub fn save_partitions(&self, partitions: &[Partition]) -> Result<Vec<PathBuf>> {
        self.partitions()
            .write_all(partitions)
            .map_err(storage_error)
    }
}

/// Read any table file, mapping failures into the engine error type
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<RecordSet> {
    let path = path.as_ref();
    let records = read_table(path).map_err(storage_error)?;
    info!("Read {} rows from {:?}", records.len(), path);
    Ok(records)
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    read_csv(path).map_err(storage_error)
}

/// Load a schema document; malformed documents surface as schema errors
pub fn load_field_schema<P: AsRef<Path>>(path: P) -> Result<FieldSchema> {
    load_schema(path).map_err(|e| match e.downcast::<Error>() {
        Ok(inner) => inner,
        Err(other) => storage_error(other),
    })
}

fn storage_error(e: anyhow::Error) -> Error {
    Error::Storage(format!("{:#}", e))
}

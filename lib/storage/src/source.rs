// Raw inputs: delimited text and the JSON field schema
use anyhow::{Context, Result};
use filmx_core::{FieldSchema, RawTable};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a CSV file with a header row. Empty fields become missing cells.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    info!("Reading CSV data from: {:?}", path);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading row {} of {}", line, path.display()))?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    info!(rows = rows.len(), columns = headers.len(), "CSV loaded");
    Ok(RawTable::new(headers, rows))
}

/// Load and validate a JSON field schema
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<FieldSchema> {
    let path = path.as_ref();
    info!("Loading schema from: {:?}", path);
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let schema = FieldSchema::from_json_str(&json)?;
    Ok(schema)
}

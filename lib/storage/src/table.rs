// Typed table files
//
// Layout: 4-byte magic, 32-byte SHA-256 of the payload, payload.
// The payload is the bincode encoding of the RecordSet, gzip compressed.
use anyhow::{anyhow, bail, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use filmx_core::RecordSet;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

pub const TABLE_MAGIC: &[u8; 4] = b"FXT1";
pub const TABLE_EXTENSION: &str = "fxt";

const MAGIC_LEN: usize = 4;
const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC_LEN + CHECKSUM_LEN;

/// Encode a record set into table file bytes
pub fn encode_table(records: &RecordSet) -> Result<Vec<u8>> {
    let data = bincode::serialize(records)
        .map_err(|e| anyhow!("Serialization error: {}", e))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data)?;
    let payload = encoder.finish()?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(TABLE_MAGIC);
    bytes.extend_from_slice(&Sha256::digest(&payload));
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode table file bytes, verifying magic and checksum
pub fn decode_table(bytes: &[u8]) -> Result<RecordSet> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC_LEN] != TABLE_MAGIC {
        bail!("not a filmx table file");
    }
    let (checksum, payload) = bytes[MAGIC_LEN..].split_at(CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        bail!("checksum mismatch");
    }

    let mut decoder = GzDecoder::new(payload);
    let mut data = Vec::new();
    decoder.read_to_end(&mut data)?;

    let records: RecordSet = bincode::deserialize(&data)
        .map_err(|e| anyhow!("Deserialization error: {}", e))?;
    // Re-check column invariants of the decoded set
    Ok(RecordSet::new(records.into_columns())?)
}

/// Write a record set atomically (temp file + rename)
pub fn write_table<P: AsRef<Path>>(path: P, records: &RecordSet) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_table(records)?;

    let tmpdir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&tmpdir)?;

    AtomicFile::new_with_tmpdir(path, OverwriteBehavior::AllowOverwrite, &tmpdir)
        .write(|f| f.write_all(&bytes))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_table<P: AsRef<Path>>(path: P) -> Result<RecordSet> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_table(&bytes).with_context(|| format!("decoding {}", path.display()))
}

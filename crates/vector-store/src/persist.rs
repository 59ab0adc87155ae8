//! Index snapshot: `vectors.bin` blob plus `chunks.json` manifest, written and read together.

use crate::embeddings::fnv1a_64;
use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use report_text_chunker::Chunk;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

pub const INDEX_SCHEMA_VERSION: u32 = 1;
pub const VECTORS_FILE: &str = "vectors.bin";
pub const MANIFEST_FILE: &str = "chunks.json";

const BLOB_MAGIC: &[u8; 4] = b"RLV1";
const HEADER_LEN: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
struct IndexManifest {
    schema_version: u32,
    dimension: usize,
    count: usize,
    vectors_checksum: String,
    chunks: Vec<String>,
}

pub async fn save_snapshot(dir: &Path, index: &FlatIndex) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let dimension = index.dimension().unwrap_or(0);
    let blob = encode_vectors(dimension, index.len(), index.data())?;
    let manifest = IndexManifest {
        schema_version: INDEX_SCHEMA_VERSION,
        dimension,
        count: index.len(),
        vectors_checksum: checksum_hex(&blob),
        chunks: index.chunks().iter().map(|c| c.text.clone()).collect(),
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

    let vectors_path = dir.join(VECTORS_FILE);
    let manifest_path = dir.join(MANIFEST_FILE);
    let vectors_tmp = vectors_path.with_extension("bin.tmp");
    let manifest_tmp = manifest_path.with_extension("json.tmp");

    // Both halves are fully written before either replaces the live snapshot
    tokio::fs::write(&vectors_tmp, &blob).await?;
    tokio::fs::write(&manifest_tmp, &manifest_bytes).await?;
    tokio::fs::rename(&vectors_tmp, &vectors_path).await?;
    tokio::fs::rename(&manifest_tmp, &manifest_path).await?;

    Ok(())
}

pub async fn load_snapshot(dir: &Path) -> Result<FlatIndex> {
    let vectors_path = dir.join(VECTORS_FILE);
    let manifest_path = dir.join(MANIFEST_FILE);

    let blob = read_optional(&vectors_path).await?;
    let manifest = read_optional(&manifest_path).await?;

    let (blob, manifest_bytes) = match (blob, manifest) {
        (Some(blob), Some(manifest)) => (blob, manifest),
        (None, None) => {
            return Err(VectorStoreError::IoError(std::io::Error::new(
                ErrorKind::NotFound,
                format!("no index snapshot in {}", dir.display()),
            )));
        }
        (Some(_), None) => return Err(missing_half(&manifest_path)),
        (None, Some(_)) => return Err(missing_half(&vectors_path)),
    };

    let manifest: IndexManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| VectorStoreError::corrupt(format!("unreadable manifest: {e}")))?;
    if manifest.schema_version != INDEX_SCHEMA_VERSION {
        return Err(VectorStoreError::corrupt(format!(
            "unsupported schema_version {} (expected {INDEX_SCHEMA_VERSION})",
            manifest.schema_version
        )));
    }

    let (dimension, count, data) = decode_vectors(&blob)?;

    if manifest.count != manifest.chunks.len() {
        return Err(VectorStoreError::corrupt(format!(
            "manifest declares {} chunks but lists {}",
            manifest.count,
            manifest.chunks.len()
        )));
    }
    if count != manifest.count {
        return Err(VectorStoreError::corrupt(format!(
            "vector count {count} does not match chunk count {}",
            manifest.count
        )));
    }
    if dimension != manifest.dimension {
        return Err(VectorStoreError::corrupt(format!(
            "vector dimension {dimension} does not match manifest dimension {}",
            manifest.dimension
        )));
    }
    if checksum_hex(&blob) != manifest.vectors_checksum {
        return Err(VectorStoreError::corrupt(
            "vector blob checksum does not match manifest",
        ));
    }

    let chunks = manifest
        .chunks
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk::new(index, text))
        .collect();
    let dimension = (count > 0).then_some(dimension);

    Ok(FlatIndex::from_parts(dimension, chunks, data))
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn missing_half(path: &Path) -> VectorStoreError {
    VectorStoreError::corrupt(format!(
        "snapshot is missing {}",
        path.file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
    ))
}

fn checksum_hex(bytes: &[u8]) -> String {
    format!("{:016x}", fnv1a_64(bytes))
}

fn encode_vectors(dimension: usize, count: usize, data: &[f32]) -> Result<Vec<u8>> {
    let dim = u32::try_from(dimension)
        .map_err(|_| VectorStoreError::corrupt(format!("dimension {dimension} exceeds u32")))?;
    let rows = u32::try_from(count)
        .map_err(|_| VectorStoreError::corrupt(format!("count {count} exceeds u32")))?;

    let mut out = Vec::with_capacity(HEADER_LEN + data.len() * 4);
    out.extend_from_slice(BLOB_MAGIC);
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&rows.to_le_bytes());
    for v in data {
        out.extend_from_slice(&v.to_le_bytes());
    }
    Ok(out)
}

fn decode_vectors(bytes: &[u8]) -> Result<(usize, usize, Vec<f32>)> {
    if bytes.len() < HEADER_LEN || &bytes[0..4] != BLOB_MAGIC {
        return Err(VectorStoreError::corrupt("vector blob has a bad header"));
    }
    let dimension = read_u32(&bytes[4..8]) as usize;
    let count = read_u32(&bytes[8..12]) as usize;

    let expected_len = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(HEADER_LEN));
    if expected_len != Some(bytes.len()) {
        return Err(VectorStoreError::corrupt(format!(
            "vector blob holds {} bytes, expected {count} x {dimension} floats",
            bytes.len()
        )));
    }
    if count > 0 && dimension == 0 {
        return Err(VectorStoreError::corrupt("vector blob has zero dimension"));
    }

    let data = bytes[HEADER_LEN..]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok((dimension, count, data))
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

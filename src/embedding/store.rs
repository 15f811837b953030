use super::Embedding;
use crate::error::{MiphyError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const STORE_TAG: [u8; 8] = *b"MIPHYEMB";
const STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredEmbedding {
    tag: [u8; 8],
    version: u32,
    embedding: Embedding,
}

pub fn save_embedding(embedding: &Embedding, path: &Path) -> Result<()> {
    let stored = StoredEmbedding {
        tag: STORE_TAG,
        version: STORE_VERSION,
        embedding: embedding.clone(),
    };
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &stored)?;
    writer.flush()?;
    Ok(())
}

pub fn load_embedding(path: &Path) -> Result<Embedding> {
    let reader = BufReader::new(File::open(path)?);
    let stored: StoredEmbedding = bincode::deserialize_from(reader)?;
    if stored.tag != STORE_TAG {
        return Err(MiphyError::Store(format!(
            "{} is not a coordinate file written by this tool",
            path.display()
        )));
    }
    if stored.version != STORE_VERSION {
        return Err(MiphyError::Store(format!(
            "{} uses coordinate format version {}, expected {}",
            path.display(),
            stored.version,
            STORE_VERSION
        )));
    }
    let expected = stored.embedding.rows.checked_mul(stored.embedding.dims);
    if expected != Some(stored.embedding.values.len()) {
        return Err(MiphyError::Store(format!("{} is truncated or corrupt", path.display())));
    }
    Ok(stored.embedding)
}

/// Loads a stored embedding only if it was derived for `leaf_count` leaves.
/// `Ok(None)` means the file is absent or stale and must be re-derived.
pub fn load_if_current(path: &Path, leaf_count: usize) -> Result<Option<Embedding>> {
    if !path.is_file() {
        return Ok(None);
    }
    let embedding = load_embedding(path)?;
    if embedding.rows() != leaf_count {
        return Ok(None);
    }
    Ok(Some(embedding))
}

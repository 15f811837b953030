use crate::embedding::{load_if_current, save_embedding, Embedding};
use crate::error::{MiphyError, Result};
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Embeddings stored under the user cache directory, keyed by the tree text
/// and the dimension cap they were derived with.
pub struct EmbeddingCache {
    cache_dir: PathBuf,
}

impl EmbeddingCache {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("org", "miphy", "miphy-tools")
            .ok_or_else(|| MiphyError::runtime("failed to determine project directories"))?;
        Self::in_dir(proj_dirs.cache_dir().join("coords"))
    }

    pub fn in_dir(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_key(tree_text: &str, max_dimensions: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(tree_text.trim().as_bytes());
        hasher.update(max_dimensions.to_le_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get_cache_path(&self, tree_text: &str, max_dimensions: usize) -> PathBuf {
        self.cache_dir
            .join(format!("{}.coords", Self::cache_key(tree_text, max_dimensions)))
    }

    /// A cached embedding with the expected row count; unreadable or stale
    /// entries count as misses.
    pub fn get(&self, tree_text: &str, max_dimensions: usize, leaf_count: usize) -> Option<Embedding> {
        let path = self.get_cache_path(tree_text, max_dimensions);
        load_if_current(&path, leaf_count).ok().flatten()
    }

    pub fn put(&self, tree_text: &str, max_dimensions: usize, embedding: &Embedding) -> Result<PathBuf> {
        let path = self.get_cache_path(tree_text, max_dimensions);
        save_embedding(embedding, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_depends_on_dimension_cap() {
        let tree = "((a:1,b:1):1,c:2);";
        assert_ne!(EmbeddingCache::cache_key(tree, 0), EmbeddingCache::cache_key(tree, 2));
        assert_eq!(EmbeddingCache::cache_key(tree, 0), EmbeddingCache::cache_key(" ((a:1,b:1):1,c:2);\n", 0));
    }

    #[test]
    fn stores_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::in_dir(dir.path().join("coords")).unwrap();
        let embedding = Embedding::from_row_major(2, 1, vec![0.0, 1.5]);
        cache.put("(a,b);", 0, &embedding).unwrap();
        assert_eq!(cache.get("(a,b);", 0, 2), Some(embedding));
        assert_eq!(cache.get("(a,b);", 0, 3), None);
        assert_eq!(cache.get("(a,c);", 0, 2), None);
    }
}

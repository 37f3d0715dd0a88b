//! Local embedded index: a small JSON-persisted vector store for one
//! uploaded document, searched by brute-force cosine similarity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use rag_query::providers::Embedder;

use crate::chunker::{CHUNK_OVERLAP, CHUNK_SIZE, split_text};
use crate::errors::DocIndexError;
use crate::pdf::extract_pdf_text;

/// File name of the persisted index inside its folder.
pub const INDEX_FILE: &str = "index.json";

/// One embedded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub text: String,
    pub vector: Vec<f32>,
}

/// In-memory form of the persisted index.
#[derive(Debug, Serialize, Deserialize)]
pub struct LocalIndex {
    /// Dimensionality every stored vector must match.
    pub dim: usize,
    pub entries: Vec<IndexEntry>,
}

impl LocalIndex {
    pub fn new() -> Self {
        Self {
            dim: 0,
            entries: Vec::new(),
        }
    }

    /// Appends an embedded chunk, fixing the index dimension on first push.
    ///
    /// # Errors
    /// Returns `DocIndexError::InvalidIndex` on dimension mismatch.
    pub fn push(&mut self, text: String, vector: Vec<f32>) -> Result<(), DocIndexError> {
        if self.dim == 0 {
            self.dim = vector.len();
        } else if vector.len() != self.dim {
            return Err(DocIndexError::InvalidIndex(format!(
                "vector length {} != index dim {}",
                vector.len(),
                self.dim
            )));
        }
        self.entries.push(IndexEntry { text, vector });
        Ok(())
    }

    /// Writes the index as JSON under `folder`, creating it if needed.
    pub fn save(&self, folder: &Path) -> Result<PathBuf, DocIndexError> {
        std::fs::create_dir_all(folder)?;
        let path = folder.join(INDEX_FILE);
        let raw = serde_json::to_string(self)?;
        std::fs::write(&path, raw)?;
        Ok(path)
    }

    /// Loads a previously saved index from `folder`.
    pub fn load(folder: &Path) -> Result<Self, DocIndexError> {
        let path = folder.join(INDEX_FILE);
        let raw = std::fs::read_to_string(&path)?;
        let index: LocalIndex = serde_json::from_str(&raw)?;
        if index.entries.iter().any(|e| e.vector.len() != index.dim) {
            return Err(DocIndexError::InvalidIndex(format!(
                "corrupt index at {}: mixed vector dimensions",
                path.display()
            )));
        }
        Ok(index)
    }

    /// Top-k entries by cosine similarity to `query`, best first.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<&IndexEntry> {
        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|e| (cosine(query, &e.vector), e))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(top_k).map(|(_, e)| e).collect()
    }
}

impl Default for LocalIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// Chunk a PDF, embed every chunk, and persist the index under
/// `index_folder`. Returns the number of indexed chunks.
///
/// # Errors
/// Propagates PDF, embedding, and filesystem failures.
pub async fn build_index(
    document_path: &Path,
    index_folder: &Path,
    embedder: &dyn Embedder,
) -> Result<usize, DocIndexError> {
    let text = extract_pdf_text(document_path)?;
    let chunks = split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);

    let mut index = LocalIndex::new();
    for chunk in chunks {
        let vector = embedder.embed(&chunk).await?;
        index.push(chunk, vector)?;
    }

    let indexed = index.entries.len();
    let path = index.save(index_folder)?;

    info!(
        target: "doc_index::index",
        document = %document_path.display(),
        index = %path.display(),
        chunks = indexed,
        "local index built"
    );

    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, vector: Vec<f32>) -> (String, Vec<f32>) {
        (text.to_string(), vector)
    }

    fn sample_index() -> LocalIndex {
        let mut index = LocalIndex::new();
        for (text, vector) in [
            entry("north", vec![1.0, 0.0]),
            entry("east", vec![0.0, 1.0]),
            entry("north-east", vec![0.7, 0.7]),
        ] {
            index.push(text, vector).unwrap();
        }
        index
    }

    #[test]
    fn search_ranks_by_cosine_similarity() {
        let index = sample_index();
        let hits = index.search(&[1.0, 0.1], 2);
        assert_eq!(hits[0].text, "north");
        assert_eq!(hits[1].text, "north-east");
    }

    #[test]
    fn search_caps_at_top_k_and_index_size() {
        let index = sample_index();
        assert_eq!(index.search(&[1.0, 0.0], 10).len(), 3);
        assert_eq!(index.search(&[1.0, 0.0], 1).len(), 1);
    }

    #[test]
    fn rejects_mismatched_vector_dimensions() {
        let mut index = sample_index();
        let err = index.push("bad".into(), vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, DocIndexError::InvalidIndex(_)));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();
        index.save(dir.path()).unwrap();

        let loaded = LocalIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.dim, 2);
        assert_eq!(loaded.entries.len(), 3);
        assert_eq!(loaded.entries[0].text, "north");
    }
}

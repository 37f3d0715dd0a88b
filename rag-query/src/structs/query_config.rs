//! Configuration layer: reads runtime settings from environment variables
//! and exposes strongly typed configs for embeddings, the vector store, and
//! search behavior.
//!
//! The active collection name is resolved from a small persisted registry
//! file so that switching collections does not require re-deploying the
//! service; `QDRANT_COLLECTION` overrides the registry when set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::rag_query_error::RagQueryError;

/// Embedding backend configuration (endpoint, model, and dimension).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding endpoint (e.g., "http://localhost:11434").
    pub url: String,
    /// Embedding model identifier (e.g., "bge-m3").
    pub model: String,
    /// Embedding vector dimensionality (e.g., 1024 for bge-m3).
    pub dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "bge-m3".to_string(),
            dim: 1024,
        }
    }
}

/// Vector store connectivity and collection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// gRPC URL for Qdrant (e.g., "http://localhost:6334").
    pub url: String,
    /// Active collection to search (resolved from registry/env, see below).
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "documents".to_string(),
        }
    }
}

/// Search behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Size of the ranked result pool fetched per new query.
    pub pool_k: u64,
    /// Default number of hits surfaced per call / per "continue".
    pub batch_size: usize,
    /// Page size for the full-collection source scan.
    pub scan_page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pool_k: 15,
            batch_size: 3,
            scan_page_size: 1000,
        }
    }
}

/// Shape of the persisted collection registry file.
#[derive(Debug, Deserialize)]
struct CollectionRegistry {
    active_collection: String,
}

/// Top-level runtime configuration for the query pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Embeddings backend configuration.
    pub embedding: EmbeddingConfig,
    /// Vector store connectivity & collection settings.
    pub qdrant: QdrantConfig,
    /// Search behavior settings.
    pub search: SearchConfig,
}

impl QueryConfig {
    /// Build configuration from environment variables and the collection
    /// registry file.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_COLLECTION` (overrides the registry file)
    /// - `COLLECTION_REGISTRY_PATH` (default: "config/active_collection.json")
    /// - `OLLAMA_URL` (default: "http://localhost:11434")
    /// - `EMBEDDING_MODEL` (default: "bge-m3")
    /// - `EMBEDDING_DIM` (default: 1024)
    /// - `RAG_POOL_K` (default: 15)
    /// - `RAG_BATCH_SIZE` (default: 3)
    /// - `RAG_SCAN_PAGE_SIZE` (default: 1000)
    pub fn from_env() -> Result<Self, RagQueryError> {
        let embedding = EmbeddingConfig {
            url: std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
            model: std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "bge-m3".into()),
            dim: read_usize_env("EMBEDDING_DIM").unwrap_or(1024),
        };

        let qdrant = QdrantConfig {
            url: std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".into()),
            collection: resolve_active_collection()?,
        };

        let search = SearchConfig {
            pool_k: read_usize_env("RAG_POOL_K").map(|v| v as u64).unwrap_or(15),
            batch_size: read_usize_env("RAG_BATCH_SIZE").unwrap_or(3),
            scan_page_size: read_usize_env("RAG_SCAN_PAGE_SIZE")
                .map(|v| v as u32)
                .unwrap_or(1000),
        };

        // Basic validations
        if embedding.dim == 0 {
            return Err(RagQueryError::InvalidConfig(
                "EMBEDDING_DIM must be > 0".into(),
            ));
        }
        if search.pool_k == 0 {
            return Err(RagQueryError::InvalidConfig("RAG_POOL_K must be > 0".into()));
        }
        if search.batch_size == 0 {
            return Err(RagQueryError::InvalidConfig(
                "RAG_BATCH_SIZE must be > 0".into(),
            ));
        }

        Ok(Self {
            embedding,
            qdrant,
            search,
        })
    }
}

/// Resolve the active collection name.
///
/// Precedence:
/// 1. `QDRANT_COLLECTION` if present and non-empty
/// 2. the registry file at `COLLECTION_REGISTRY_PATH`
/// 3. "documents"
fn resolve_active_collection() -> Result<String, RagQueryError> {
    if let Ok(name) = std::env::var("QDRANT_COLLECTION") {
        if !name.trim().is_empty() {
            return Ok(name);
        }
    }

    let path = std::env::var("COLLECTION_REGISTRY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/active_collection.json"));

    if path.exists() {
        let raw = std::fs::read_to_string(&path)?;
        let registry: CollectionRegistry = serde_json::from_str(&raw)?;
        if registry.active_collection.trim().is_empty() {
            return Err(RagQueryError::InvalidConfig(format!(
                "empty active_collection in {}",
                path.display()
            )));
        }
        return Ok(registry.active_collection);
    }

    Ok("documents".to_string())
}

/// Read a `usize` from env, with error mapped to `RagQueryError`.
fn read_usize_env(key: &str) -> Result<usize, RagQueryError> {
    match std::env::var(key) {
        Ok(v) => v.parse::<usize>().map_err(|_| RagQueryError::EnvParse {
            key: key.into(),
            value: v,
        }),
        Err(_) => Err(RagQueryError::EnvMissing { key: key.into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_serving_contract() {
        let search = SearchConfig::default();
        assert_eq!(search.pool_k, 15);
        assert_eq!(search.batch_size, 3);
        assert_eq!(search.scan_page_size, 1000);
    }

    #[test]
    fn registry_file_parses() {
        let raw = r#"{"active_collection": "handbook_2024"}"#;
        let registry: CollectionRegistry = serde_json::from_str(raw).unwrap();
        assert_eq!(registry.active_collection, "handbook_2024");
    }
}

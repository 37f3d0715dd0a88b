//! Unified error type for the doc-index crate.

use thiserror::Error;

/// Errors produced while building or querying a local document index.
#[derive(Debug, Error)]
pub enum DocIndexError {
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error on the persisted index.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// PDF loading/extraction failed.
    #[error("pdf error: {0}")]
    Pdf(String),

    /// The persisted index is malformed or inconsistent.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// Embedding backend failure (via the shared embedding client).
    #[error("embedding error: {0}")]
    Embedding(#[from] rag_query::RagQueryError),

    /// Completion backend failure before any token was produced.
    #[error("completion error: {0}")]
    Completion(#[from] ai_llm_service::error_handler::LlmServiceError),
}

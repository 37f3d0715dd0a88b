//! Unified error type for the rag-query crate.

use thiserror::Error;

/// Errors produced by the query pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum RagQueryError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Required environment variable is missing.
    #[error("missing env variable: {key}")]
    EnvMissing { key: String },

    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O & filesystem ────────────────────────────────────────────────────
    /// Underlying I/O error (collection registry file, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // ── JSON / serialization ────────────────────────────────────────────────
    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Vector store client / transport ─────────────────────────────────────
    /// Transport / client error from the vector store.
    #[error("vector store error: {0}")]
    VectorDb(String),

    // ── Embeddings backend ──────────────────────────────────────────────────
    /// Embedding backend failed to initialize or to embed inputs.
    #[error("embedding error: {0}")]
    Embedding(String),

    // ── Completion backend ──────────────────────────────────────────────────
    /// Streaming completion client failed before any token was produced.
    #[error("completion error: {0}")]
    Completion(#[from] ai_llm_service::error_handler::LlmServiceError),
}

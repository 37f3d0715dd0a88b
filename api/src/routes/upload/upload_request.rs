use serde::{Deserialize, Serialize};

/// Request body for `POST /upload/index`.
#[derive(Debug, Deserialize)]
pub struct IndexDocumentRequest {
    /// Path of the PDF to chunk and embed.
    pub document_path: String,
    /// Folder the local index is written to.
    pub index_folder: String,
}

/// Response body for `POST /upload/index`.
#[derive(Debug, Serialize)]
pub struct IndexDocumentResponse {
    pub chunks_indexed: usize,
    pub index_folder: String,
}

/// Request body for `POST /upload/ask`.
#[derive(Debug, Deserialize)]
pub struct AskDocumentRequest {
    /// Folder a local index was previously written to.
    pub index_folder: String,
    /// Free-text question answered against the uploaded document only.
    pub question: String,
    /// Chunks pulled into the context; server default when omitted.
    pub top_k: Option<usize>,
}

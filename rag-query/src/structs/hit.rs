//! Retrieved passage as returned by the vector store.

use serde::{Deserialize, Serialize};

/// One retrieved passage, immutable once produced by a search.
///
/// Hits arrive in relevance order (closest first under the collection's
/// distance metric) and are served to callers in contiguous batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// Document identifier the passage was indexed under (e.g. a file name).
    pub source: String,
    /// Page number within the source document.
    pub page: i64,
    /// Passage content.
    pub text: String,
    /// Similarity score reported by the vector store.
    pub score: f32,
}

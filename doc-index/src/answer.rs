//! One-off question answering against a previously built local index.

use std::path::Path;

use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use ai_llm_service::completion_service::CompletionService;
use rag_query::providers::Embedder;

use crate::errors::DocIndexError;
use crate::index::LocalIndex;

/// Default number of chunks pulled into the answer context.
pub const DEFAULT_TOP_K: usize = 3;

/// Load the local index from `index_folder`, retrieve the `top_k` chunks
/// closest to `question`, and stream the model's answer tokens.
///
/// Unlike the main pipeline this path emits tokens only; no citation item
/// follows the answer.
///
/// # Errors
/// Propagates index-load, embedding, and completion-request failures.
pub async fn answer_from_index(
    index_folder: &Path,
    question: &str,
    top_k: usize,
    embedder: &dyn Embedder,
    completion: &CompletionService,
) -> Result<ReceiverStream<String>, DocIndexError> {
    let index = LocalIndex::load(index_folder)?;
    let query_vector = embedder.embed(question).await?;

    let hits = index.search(&query_vector, top_k);
    info!(
        target: "doc_index::answer",
        index = %index_folder.display(),
        chunks = hits.len(),
        "answering from local index"
    );

    // Chunk texts are concatenated as-is; this context never carries the
    // File/Page framing of the shared-collection pipeline.
    let mut context = String::new();
    for hit in hits {
        context.push_str(&hit.text);
    }

    let stream = completion.stream_chat(question, &context).await?;
    Ok(stream)
}

//! POST /upload/index — chunk, embed, and index one uploaded PDF.
//! POST /upload/ask — stream an answer from a previously built local index.

use std::path::Path;
use std::sync::Arc;

use axum::{Json, extract::State, response::Response};
use tracing::debug;

use doc_index::answer::DEFAULT_TOP_K;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::stream_response,
    routes::upload::upload_request::{
        AskDocumentRequest, IndexDocumentRequest, IndexDocumentResponse,
    },
};

/// Handler: POST /upload/index
pub async fn index_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IndexDocumentRequest>,
) -> AppResult<Json<IndexDocumentResponse>> {
    debug!(
        document = %body.document_path,
        index = %body.index_folder,
        "index_document: start"
    );

    let chunks_indexed = doc_index::build_index(
        Path::new(&body.document_path),
        Path::new(&body.index_folder),
        state.embedder.as_ref(),
    )
    .await?;

    Ok(Json(IndexDocumentResponse {
        chunks_indexed,
        index_folder: body.index_folder,
    }))
}

/// Handler: POST /upload/ask
///
/// Streams answer tokens only; this path never emits a citation block.
pub async fn ask_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskDocumentRequest>,
) -> AppResult<Response> {
    debug!(
        index = %body.index_folder,
        question_len = body.question.len(),
        "ask_document: start"
    );

    let stream = doc_index::answer_from_index(
        Path::new(&body.index_folder),
        &body.question,
        body.top_k.unwrap_or(DEFAULT_TOP_K),
        state.embedder.as_ref(),
        &state.completion,
    )
    .await?;

    Ok(stream_response(stream))
}

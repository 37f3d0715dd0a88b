//! GET /documents — sources known to the active collection.
//! POST /documents/rescan — drop the cached listing.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::debug;

use crate::{core::app_state::AppState, error_handler::AppResult};

/// Response body for `GET /documents`.
#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    /// De-duplicated source identifiers, sorted.
    pub documents: Vec<String>,
}

/// Response body for `POST /documents/rescan`.
#[derive(Debug, Serialize)]
pub struct RescanResponse {
    pub invalidated: bool,
}

/// Handler: GET /documents
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<DocumentsResponse>> {
    let documents: Vec<String> = state.pipeline.get_all_files().await?.into_iter().collect();

    debug!(count = documents.len(), "list_documents: success");

    Ok(Json(DocumentsResponse { documents }))
}

/// Handler: POST /documents/rescan
///
/// The collection can change underneath the memoized scan; this drops the
/// cache so the next listing reflects the current contents.
pub async fn rescan_documents(State(state): State<Arc<AppState>>) -> Json<RescanResponse> {
    state.pipeline.invalidate_sources().await;
    Json(RescanResponse { invalidated: true })
}

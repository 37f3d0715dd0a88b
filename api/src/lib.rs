use std::{env, error::Error, sync::Arc};

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;

use crate::core::app_state::AppState;
use crate::routes::{
    ask::ask_route::ask_question,
    documents::documents_route::{list_documents, rescan_documents},
    health_route::health,
    upload::upload_route::{ask_document, index_document},
};

pub async fn start() -> Result<(), Box<dyn Error>> {
    let host_url = env::var("API_ADDRESS").expect("API_ADDRESS must be set in environment");

    let state = Arc::new(AppState::from_env()?);

    let app = Router::new()
        .route("/ask", post(ask_question))
        .route("/documents", get(list_documents))
        .route("/documents/rescan", post(rescan_documents))
        .route("/upload/index", post(index_document))
        .route("/upload/ask", post(ask_document))
        .route("/health", get(health))
        .with_state(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url).await?;

    tracing::info!(address = %host_url, "api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    // Wait for the Ctrl+C signal
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}

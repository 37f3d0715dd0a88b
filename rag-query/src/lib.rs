//! Session-aware RAG query pipeline.
//!
//! Public API:
//! - [`QueryPipeline::process_query`]: embed + search on a new question, or
//!   page through the previous result set on `"continue"`, streaming answer
//!   tokens and a final citation item.
//! - [`QueryPipeline::get_all_files`]: cached full-collection scan of known
//!   document sources, with a manual invalidation hook.

pub mod context;
pub mod embedding;
pub mod errors;
pub mod pipeline;
pub mod providers;
pub mod session;
pub mod sources;
pub mod structs;
mod vector_db;

pub use errors::rag_query_error::RagQueryError;
pub use pipeline::QueryPipeline;
pub use structs::hit::Hit;
pub use structs::query_config::QueryConfig;
pub use vector_db::QdrantStore;

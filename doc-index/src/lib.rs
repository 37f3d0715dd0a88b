//! Ad-hoc document Q&A: chunk one PDF, embed it into a small local index,
//! and answer questions against it without touching the shared collection.
//!
//! Public API:
//! - [`build_index`]: PDF → overlapping character chunks → embedded local
//!   index persisted under a folder.
//! - [`answer_from_index`]: load the index, retrieve top-k chunks, stream
//!   the model's answer tokens.

pub mod answer;
pub mod chunker;
pub mod errors;
pub mod index;
pub mod pdf;

pub use answer::answer_from_index;
pub use errors::DocIndexError;
pub use index::{LocalIndex, build_index};

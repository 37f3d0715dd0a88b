//! The query pipeline: session lookup, new-query vs continuation branching,
//! batch pagination, context building, and answer streaming.
//!
//! Every call produces a lazy sequence of strings: the model's answer tokens
//! in arrival order, then exactly one citation item for the served batch.
//! Informational outcomes ("no previous query", "no more results") and
//! pipeline failures are emitted as plain items on the same sequence; the
//! call itself never fails.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use ai_llm_service::completion_service::CompletionService;
use ai_llm_service::config::completion_config::CompletionConfig;

use crate::context::{build_citations, build_context};
use crate::embedding::OllamaEmbedder;
use crate::errors::rag_query_error::RagQueryError;
use crate::providers::{CompletionClient, Embedder, LlmCompletionClient, VectorStore};
use crate::session::SessionStore;
use crate::sources::SourceCache;
use crate::structs::hit::Hit;
use crate::structs::query_config::QueryConfig;
use crate::vector_db::QdrantStore;

/// Reserved control token: advance the pagination cursor instead of searching.
/// Matched case-insensitively against the whole question, without trimming.
pub const CONTINUE_COMMAND: &str = "continue";

/// Served when "continue" arrives before any question was asked.
pub const NO_PREVIOUS_QUERY: &str = "No previous query found. Please enter a new question.";

/// Served when the pagination cursor has moved past the result set.
pub const NO_MORE_RESULTS: &str = "No more results to display.";

/// Buffered items between the producing task and the consumer; the producer
/// suspends once the consumer stops pulling.
const STREAM_BUFFER: usize = 16;

/// Session-aware retrieval/pagination/streaming pipeline.
pub struct QueryPipeline {
    cfg: QueryConfig,
    sessions: SessionStore,
    sources: SourceCache,
    embedder: Arc<dyn Embedder>,
    vector: Arc<dyn VectorStore>,
    completion: Arc<dyn CompletionClient>,
}

impl QueryPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        cfg: QueryConfig,
        embedder: Arc<dyn Embedder>,
        vector: Arc<dyn VectorStore>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            cfg,
            sessions: SessionStore::new(),
            sources: SourceCache::new(),
            embedder,
            vector,
            completion,
        }
    }

    /// Assemble the production pipeline from environment configuration.
    ///
    /// # Errors
    /// Returns configuration errors from any collaborator constructor.
    pub fn from_env() -> Result<Self, RagQueryError> {
        let cfg = QueryConfig::from_env()?;

        let embedder = Arc::new(OllamaEmbedder::new(cfg.embedding.clone())?);
        let vector = Arc::new(QdrantStore::new(cfg.qdrant.clone(), cfg.search.clone()));
        let completion_cfg = CompletionConfig::from_env()?;
        let completion = Arc::new(LlmCompletionClient::new(Arc::new(CompletionService::new(
            completion_cfg,
        )?)));

        Ok(Self::new(cfg, embedder, vector, completion))
    }

    /// Process one question (or `"continue"`) for the given session.
    ///
    /// Returns immediately with a lazy stream; the work runs in a background
    /// task that suspends when the consumer lags and stops when the consumer
    /// is dropped.
    pub fn process_query(
        self: &Arc<Self>,
        question: String,
        selected_sources: Option<Vec<String>>,
        session_id: String,
        batch_size: Option<usize>,
    ) -> ReceiverStream<String> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let pipeline = Arc::clone(self);
        let batch_size = batch_size.unwrap_or(pipeline.cfg.search.batch_size);

        tokio::spawn(async move {
            if let Err(err) = pipeline
                .run_query(&tx, question, selected_sources, session_id, batch_size)
                .await
            {
                warn!(
                    target: "rag_query::pipeline",
                    error = %err,
                    "query failed"
                );
                let _ = tx.send(format!("Error occurred: {err}")).await;
            }
        });

        ReceiverStream::new(rx)
    }

    async fn run_query(
        &self,
        tx: &mpsc::Sender<String>,
        question: String,
        selected_sources: Option<Vec<String>>,
        session_id: String,
        batch_size: usize,
    ) -> Result<(), RagQueryError> {
        let session = self.sessions.get_or_create(&session_id).await;
        let is_continue = question.eq_ignore_ascii_case(CONTINUE_COMMAND);

        // Session-mutation section. The per-session lock covers branch
        // selection, search bookkeeping and the batch slice, and is released
        // before the completion stream starts.
        let (batch, effective_question) = {
            let mut session = session.lock().await;

            if is_continue {
                if session.last_query.is_none() {
                    let _ = tx.send(NO_PREVIOUS_QUERY.to_string()).await;
                    return Ok(());
                }
                // Strict '>' on purpose: at cursor == len one more continue
                // serves an empty batch before exhaustion is reported.
                if session.cursor > session.results.len() {
                    let _ = tx.send(NO_MORE_RESULTS.to_string()).await;
                    return Ok(());
                }
                info!(
                    target: "rag_query::pipeline",
                    session = %session_id,
                    cursor = session.cursor,
                    "continue: serving next batch"
                );
            } else {
                // Record the question before any fallible call so a later
                // "continue" can still see it.
                session.last_query = Some(question.clone());

                let vector = self.embedder.embed(&question).await?;
                let hits = self
                    .vector
                    .search(vector, self.cfg.search.pool_k, selected_sources.as_deref())
                    .await?;

                info!(
                    target: "rag_query::pipeline",
                    session = %session_id,
                    hits = hits.len(),
                    filtered = selected_sources.as_ref().map(|s| s.len()).unwrap_or(0),
                    "new query: result pool replaced"
                );

                session.results = hits;
                session.cursor = 0;
            }

            let start = session.cursor.min(session.results.len());
            let end = (session.cursor + batch_size).min(session.results.len());
            let batch: Vec<Hit> = session.results[start..end].to_vec();
            // The cursor may move past the end of the result set; the next
            // continuation call detects that and reports exhaustion.
            session.cursor += batch_size;

            let effective_question = if is_continue {
                session.last_query.clone().unwrap_or_default()
            } else {
                question
            };

            (batch, effective_question)
        };

        let context = build_context(&batch);
        let mut tokens = self
            .completion
            .stream_answer(&effective_question, &context)
            .await?;

        while let Some(token) = tokens.next().await {
            if tx.send(token).await.is_err() {
                // Consumer went away; dropping `tokens` closes the wire.
                return Ok(());
            }
        }

        let _ = tx.send(build_citations(&batch)).await;
        Ok(())
    }

    /// All document sources known to the active collection, cached per
    /// process after the first scan.
    pub async fn get_all_files(
        &self,
    ) -> Result<std::collections::BTreeSet<String>, RagQueryError> {
        self.sources.get_or_scan(self.vector.as_ref()).await
    }

    /// Forget the cached source listing; the next call rescans.
    pub async fn invalidate_sources(&self) {
        self.sources.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};

    struct FakeEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RagQueryError> {
            if self.fail {
                Err(RagQueryError::Embedding("backend unreachable".into()))
            } else {
                Ok(vec![0.1, 0.2, 0.3])
            }
        }
    }

    struct FakeStore {
        hits: Vec<Hit>,
    }

    #[async_trait]
    impl VectorStore for FakeStore {
        async fn search(
            &self,
            _vector: Vec<f32>,
            top_k: u64,
            _sources: Option<&[String]>,
        ) -> Result<Vec<Hit>, RagQueryError> {
            Ok(self.hits.iter().take(top_k as usize).cloned().collect())
        }

        async fn scan_sources(&self) -> Result<BTreeSet<String>, RagQueryError> {
            Ok(self.hits.iter().map(|h| h.source.clone()).collect())
        }
    }

    struct FakeCompletion {
        tokens: Vec<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeCompletion {
        fn new(tokens: &[&str]) -> Self {
            Self {
                tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for FakeCompletion {
        async fn stream_answer(
            &self,
            question: &str,
            context: &str,
        ) -> Result<BoxStream<'static, String>, RagQueryError> {
            self.calls
                .lock()
                .unwrap()
                .push((question.to_string(), context.to_string()));
            Ok(stream::iter(self.tokens.clone()).boxed())
        }
    }

    fn hit(source: &str, page: i64) -> Hit {
        Hit {
            source: source.to_string(),
            page,
            text: format!("passage from {source} p{page}"),
            score: 1.0,
        }
    }

    fn pipeline_with(
        hits: Vec<Hit>,
        completion: Arc<FakeCompletion>,
        embed_fails: bool,
    ) -> Arc<QueryPipeline> {
        let cfg = QueryConfig {
            embedding: Default::default(),
            qdrant: Default::default(),
            search: Default::default(),
        };
        Arc::new(QueryPipeline::new(
            cfg,
            Arc::new(FakeEmbedder { fail: embed_fails }),
            Arc::new(FakeStore { hits }),
            completion,
        ))
    }

    async fn collect(
        pipeline: &Arc<QueryPipeline>,
        question: &str,
        session_id: &str,
    ) -> Vec<String> {
        pipeline
            .process_query(question.to_string(), None, session_id.to_string(), None)
            .collect()
            .await
    }

    #[tokio::test]
    async fn continue_without_history_ends_with_one_message() {
        let completion = Arc::new(FakeCompletion::new(&["unused"]));
        let pipeline = pipeline_with(vec![hit("a.pdf", 1)], completion.clone(), false);

        let items = collect(&pipeline, "continue", "s1").await;
        assert_eq!(items, vec![NO_PREVIOUS_QUERY.to_string()]);
        assert!(completion.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn continue_is_matched_case_insensitively() {
        let completion = Arc::new(FakeCompletion::new(&["unused"]));
        let pipeline = pipeline_with(vec![hit("a.pdf", 1)], completion, false);

        let items = collect(&pipeline, "CONTINUE", "s1").await;
        assert_eq!(items, vec![NO_PREVIOUS_QUERY.to_string()]);
    }

    #[tokio::test]
    async fn batches_are_contiguous_and_non_overlapping() {
        let hits = vec![
            hit("a.pdf", 1),
            hit("a.pdf", 2),
            hit("b.pdf", 1),
            hit("b.pdf", 2),
            hit("c.pdf", 1),
            hit("c.pdf", 2),
            hit("c.pdf", 3),
        ];
        let completion = Arc::new(FakeCompletion::new(&["ok"]));
        let pipeline = pipeline_with(hits.clone(), completion.clone(), false);

        let first = collect(&pipeline, "what is this?", "s1").await;
        assert_eq!(first.last().unwrap(), &build_citations(&hits[0..3]));

        let second = collect(&pipeline, "continue", "s1").await;
        assert_eq!(second.last().unwrap(), &build_citations(&hits[3..6]));

        let third = collect(&pipeline, "continue", "s1").await;
        assert_eq!(third.last().unwrap(), &build_citations(&hits[6..7]));

        // Cursor is now 9 > 7: the result set is exhausted.
        let done = collect(&pipeline, "continue", "s1").await;
        assert_eq!(done, vec![NO_MORE_RESULTS.to_string()]);

        // Continuations reuse the stored question for the model call.
        let calls = completion.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(q, _)| q == "what is this?"));
    }

    #[tokio::test]
    async fn cursor_at_len_serves_one_empty_batch_before_exhaustion() {
        // 6 hits with batch size 3: after two batches cursor == len, which is
        // still served (empty context, completion still invoked) before the
        // terminal message.
        let hits = vec![
            hit("a.pdf", 1),
            hit("a.pdf", 2),
            hit("a.pdf", 3),
            hit("b.pdf", 1),
            hit("b.pdf", 2),
            hit("b.pdf", 3),
        ];
        let completion = Arc::new(FakeCompletion::new(&["ok"]));
        let pipeline = pipeline_with(hits, completion.clone(), false);

        collect(&pipeline, "question", "s1").await;
        collect(&pipeline, "continue", "s1").await;

        let empty = collect(&pipeline, "continue", "s1").await;
        assert_eq!(empty, vec!["ok".to_string(), String::new()]);
        assert_eq!(completion.calls.lock().unwrap().last().unwrap().1, "");

        let done = collect(&pipeline, "continue", "s1").await;
        assert_eq!(done, vec![NO_MORE_RESULTS.to_string()]);
    }

    #[tokio::test]
    async fn new_query_resets_pagination_mid_flight() {
        let hits = vec![
            hit("a.pdf", 1),
            hit("a.pdf", 2),
            hit("a.pdf", 3),
            hit("a.pdf", 4),
        ];
        let completion = Arc::new(FakeCompletion::new(&["ok"]));
        let pipeline = pipeline_with(hits.clone(), completion, false);

        collect(&pipeline, "first question", "s1").await;
        collect(&pipeline, "continue", "s1").await;

        // A fresh question mid-pagination starts over from the top.
        let restarted = collect(&pipeline, "second question", "s1").await;
        assert_eq!(restarted.last().unwrap(), &build_citations(&hits[0..3]));
    }

    #[tokio::test]
    async fn tokens_stream_before_the_citation_item() {
        let hits = vec![hit("a.pdf", 1)];
        let completion = Arc::new(FakeCompletion::new(&["The ", "answer."]));
        let pipeline = pipeline_with(hits.clone(), completion, false);

        let items = collect(&pipeline, "question", "s1").await;
        assert_eq!(
            items,
            vec![
                "The ".to_string(),
                "answer.".to_string(),
                build_citations(&hits[0..1]),
            ]
        );
    }

    #[tokio::test]
    async fn embedding_failure_yields_one_error_item() {
        let completion = Arc::new(FakeCompletion::new(&["unused"]));
        let pipeline = pipeline_with(vec![hit("a.pdf", 1)], completion.clone(), true);

        let items = collect(&pipeline, "question", "s1").await;
        assert_eq!(items.len(), 1);
        assert!(items[0].starts_with("Error occurred: "));
        assert!(completion.calls.lock().unwrap().is_empty());

        // The question was recorded before the failure, so a follow-up
        // continue does not report a missing query.
        let after = collect(&pipeline, "continue", "s1").await;
        assert_ne!(after, vec![NO_PREVIOUS_QUERY.to_string()]);
    }

    #[tokio::test]
    async fn sessions_paginate_independently() {
        let hits = vec![hit("a.pdf", 1), hit("a.pdf", 2), hit("a.pdf", 3)];
        let completion = Arc::new(FakeCompletion::new(&["ok"]));
        let pipeline = pipeline_with(hits.clone(), completion, false);

        collect(&pipeline, "question", "s1").await;
        let other = collect(&pipeline, "continue", "s2").await;
        assert_eq!(other, vec![NO_PREVIOUS_QUERY.to_string()]);
    }

    #[tokio::test]
    async fn source_listing_is_cached_until_invalidated() {
        let hits = vec![hit("a.pdf", 1), hit("b.pdf", 1)];
        let completion = Arc::new(FakeCompletion::new(&["ok"]));
        let pipeline = pipeline_with(hits, completion, false);

        let files = pipeline.get_all_files().await.unwrap();
        assert_eq!(
            files.into_iter().collect::<Vec<_>>(),
            vec!["a.pdf".to_string(), "b.pdf".to_string()]
        );

        pipeline.invalidate_sources().await;
        assert_eq!(pipeline.get_all_files().await.unwrap().len(), 2);
    }
}

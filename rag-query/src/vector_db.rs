//! Qdrant vector DB facade: connection lifecycle, filtered top-K search, and
//! the paged full-collection source scan.
//!
//! The client is rebuilt from the configured URL per operation. Building a
//! client does not touch the network, so the reconnect is cheap and safely
//! repeatable, which keeps every operation independent of connection state
//! left behind by earlier calls.

use std::collections::BTreeSet;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, PayloadIncludeSelector,
    ReadConsistencyType, ScrollPointsBuilder, SearchPointsBuilder,
    condition::ConditionOneOf, read_consistency, with_payload_selector::SelectorOptions,
};
use tracing::debug;

use crate::errors::rag_query_error::RagQueryError;
use crate::providers::VectorStore;
use crate::structs::hit::Hit;
use crate::structs::query_config::{QdrantConfig, SearchConfig};

/// Payload fields the pipeline consumes from every stored point.
const HIT_FIELDS: [&str; 3] = ["source", "page", "text"];

/// Facade over the Qdrant client bound to the active collection.
pub struct QdrantStore {
    qdrant: QdrantConfig,
    search: SearchConfig,
}

impl QdrantStore {
    pub fn new(qdrant: QdrantConfig, search: SearchConfig) -> Self {
        Self { qdrant, search }
    }

    /// Build a fresh client for the configured URL.
    ///
    /// # Errors
    /// Returns `RagQueryError::VectorDb` if the client cannot be constructed.
    fn connect(&self) -> Result<Qdrant, RagQueryError> {
        Qdrant::from_url(&self.qdrant.url)
            .build()
            .map_err(|e| RagQueryError::VectorDb(format!("client build: {e}")))
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        sources: Option<&[String]>,
    ) -> Result<Vec<Hit>, RagQueryError> {
        let client = self.connect()?;

        let mut builder = SearchPointsBuilder::new(&self.qdrant.collection, vector, top_k)
            .with_payload(include_fields(&HIT_FIELDS))
            .read_consistency(strong_consistency());

        if let Some(selected) = sources {
            if !selected.is_empty() {
                builder = builder.filter(source_filter(selected));
            }
        }

        let resp = client
            .search_points(builder)
            .await
            .map_err(|e| RagQueryError::VectorDb(format!("search_points: {e}")))?;

        debug!(
            target: "rag_query::vector_db",
            collection = %self.qdrant.collection,
            hits = resp.result.len(),
            "search completed"
        );

        Ok(resp
            .result
            .into_iter()
            .map(|sp| {
                let mut hit = Hit {
                    source: String::new(),
                    page: 0,
                    text: String::new(),
                    score: sp.score,
                };
                for (key, value) in sp.payload {
                    match key.as_str() {
                        "source" => {
                            if let Some(s) = value.into_json().as_str() {
                                hit.source = s.to_owned();
                            }
                        }
                        "page" => {
                            if let Some(n) = value.into_json().as_i64() {
                                hit.page = n;
                            }
                        }
                        "text" => {
                            if let Some(s) = value.into_json().as_str() {
                                hit.text = s.to_owned();
                            }
                        }
                        _ => {}
                    }
                }
                hit
            })
            .collect())
    }

    async fn scan_sources(&self) -> Result<BTreeSet<String>, RagQueryError> {
        let client = self.connect()?;

        let mut sources = BTreeSet::new();
        let mut offset = None;
        let mut pages = 0usize;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.qdrant.collection)
                .limit(self.search.scan_page_size)
                .with_payload(include_fields(&["source"]))
                .with_vectors(false);
            if let Some(off) = offset.take() {
                builder = builder.offset(off);
            }

            let resp = client
                .scroll(builder)
                .await
                .map_err(|e| RagQueryError::VectorDb(format!("scroll: {e}")))?;

            if resp.result.is_empty() {
                break;
            }
            pages += 1;

            for point in resp.result {
                if let Some(value) = point.payload.get("source") {
                    if let Some(s) = value.clone().into_json().as_str() {
                        sources.insert(s.to_owned());
                    }
                }
            }

            match resp.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(
            target: "rag_query::vector_db",
            collection = %self.qdrant.collection,
            pages,
            sources = sources.len(),
            "source scan completed"
        );

        Ok(sources)
    }
}

/// Payload selector that only fetches the listed fields.
fn include_fields(fields: &[&str]) -> SelectorOptions {
    SelectorOptions::Include(PayloadIncludeSelector {
        fields: fields.iter().map(|f| (*f).to_string()).collect(),
    })
}

/// Searches must observe every write committed before the call.
fn strong_consistency() -> read_consistency::Value {
    read_consistency::Value::Type(ReadConsistencyType::All.into())
}

/// OR of exact-match equality conditions on the `source` payload field.
pub(crate) fn source_filter(sources: &[String]) -> Filter {
    let should: Vec<Condition> = sources
        .iter()
        .map(|s| Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: "source".to_string(),
                r#match: Some(Match {
                    match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Keyword(
                        s.clone(),
                    )),
                }),
                ..Default::default()
            })),
        })
        .collect();

    Filter {
        should,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::r#match::MatchValue;

    fn keyword_conditions(filter: &Filter) -> Vec<(String, String)> {
        filter
            .should
            .iter()
            .filter_map(|c| match &c.condition_one_of {
                Some(ConditionOneOf::Field(fc)) => {
                    let value = match fc.r#match.as_ref()?.match_value.as_ref()? {
                        MatchValue::Keyword(k) => k.clone(),
                        _ => return None,
                    };
                    Some((fc.key.clone(), value))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn filter_matches_exactly_the_selected_sources() {
        let filter = source_filter(&["a.pdf".to_string(), "b.pdf".to_string()]);

        let conditions = keyword_conditions(&filter);
        assert_eq!(
            conditions,
            vec![
                ("source".to_string(), "a.pdf".to_string()),
                ("source".to_string(), "b.pdf".to_string()),
            ]
        );
        // Pure OR semantics: nothing mandatory, nothing excluded.
        assert!(filter.must.is_empty());
        assert!(filter.must_not.is_empty());
    }
}

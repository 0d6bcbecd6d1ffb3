//! Keyed memory records with hybrid keyword/vector retrieval
//!
//! The store owns every persisted record, its embedding, an append-only
//! interaction log, and a last-write-wins map of per-agent state. Retrieval
//! runs a keyword pass and a vector-similarity pass independently and merges
//! the two into one ranked list.

use crate::agent::memory::vector::{Embedding, LexiconEmbedder};
use crate::error::{QuorumError, QuorumResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Default number of results returned by retrieval.
pub const DEFAULT_TOP_K: usize = 5;

/// Confidence assigned when the caller does not supply one.
const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Vector matches at or below this similarity are discarded.
const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Query tokens must be longer than this to match serialized content.
const CONTENT_TOKEN_MIN_LEN: usize = 3;

const KEY_MATCH_SCORE: f64 = 1.0;
const VALUE_MATCH_SCORE: f64 = 0.8;
const LOG_MATCH_SCORE: f64 = 0.7;

/// Caller-supplied metadata for a [`MemoryStore::store`] call.
///
/// The store stamps the timestamp itself and fills in a default confidence;
/// everything added through [`Metadata::with_field`] is preserved verbatim on
/// the record.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    confidence: Option<f64>,
    extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence score (clamped to 0.0 - 1.0)
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    /// Add an arbitrary field, preserved verbatim on the stored record
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Metadata attached to a stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Insertion time of the most recent store of this key, assigned by the
    /// store, never by the caller
    pub timestamp: DateTime<Utc>,

    /// Caller confidence in the payload (0.0 - 1.0)
    pub confidence: f64,

    /// Additional caller-supplied fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One stored memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// The query or topic string this entry was stored under
    pub key: String,

    /// Arbitrary structured payload, opaque to the store
    pub value: Value,

    /// Timestamp, confidence and caller fields
    pub metadata: RecordMetadata,
}

/// How a retrieval result was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// A query token appeared in the record key
    KeywordKey,
    /// A query token appeared in the serialized value
    KeywordValue,
    /// A query token appeared in a logged interaction
    Conversation,
    /// Embedding similarity above the threshold
    Vector,
}

/// A record returned by retrieval, annotated with how it matched and how well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRecord {
    /// The matched record
    #[serde(flatten)]
    pub record: Record,

    /// Which search phase produced the match
    pub match_kind: MatchKind,

    /// Relevance score; keyword scores and vector similarities are averaged
    /// when both phases find the same key
    pub score: f64,
}

/// Confirmation returned by [`MemoryStore::store`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreReceipt {
    /// The key the record was stored under
    pub stored: String,
}

/// Ranked results of a [`MemoryStore::retrieve`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retrieval {
    /// Matches, best first, truncated to the requested limit
    pub results: Vec<RankedRecord>,

    /// Number of distinct matches before truncation
    pub count: usize,

    /// The query that produced these results
    pub query: String,
}

/// Last reported state of a named agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// Caller-supplied state fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,

    /// When the state was last written, assigned by the store
    pub last_updated: DateTime<Utc>,
}

/// Counters describing the store contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Entries in the interaction log
    pub conversations: usize,
    /// Records currently in the primary store
    pub knowledge_items: usize,
    /// Tracked agent states
    pub agent_states: usize,
    /// Stored embeddings
    pub vectors: usize,
}

#[derive(Default)]
struct Inner {
    knowledge: BTreeMap<String, Record>,
    log: Vec<Record>,
    vectors: BTreeMap<String, Embedding>,
    agent_states: BTreeMap<String, AgentState>,
}

/// The memory store.
///
/// A record and its embedding are always written under one lock guard, so no
/// reader can observe a key with a record but no vector or vice versa.
pub struct MemoryStore {
    embedder: LexiconEmbedder,
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            embedder: LexiconEmbedder::new(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Store a record under `key`, overwriting any previous record for it.
    ///
    /// The record is also appended to the interaction log, which keeps prior
    /// values of overwritten keys for chronological recall.
    pub async fn store(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        metadata: Metadata,
    ) -> QuorumResult<StoreReceipt> {
        let key = key.into();
        if key.is_empty() {
            return Err(QuorumError::validation(
                "key",
                "non-empty string",
                "empty string",
            ));
        }

        debug!(key = %key, "storing record");

        let mut extra = metadata.extra;
        // The store stays authoritative for these two fields.
        extra.remove("timestamp");
        extra.remove("confidence");

        let record = Record {
            key: key.clone(),
            value: value.into(),
            metadata: RecordMetadata {
                timestamp: Utc::now(),
                confidence: metadata.confidence.unwrap_or(DEFAULT_CONFIDENCE),
                extra,
            },
        };

        let embedding = self.embedder.embed(&key, &record.value)?;

        let mut inner = self.inner.write().await;
        inner.log.push(record.clone());
        inner.knowledge.insert(key.clone(), record);
        inner.vectors.insert(key.clone(), embedding);

        Ok(StoreReceipt { stored: key })
    }

    /// Retrieve up to `top_k` records relevant to `query`.
    ///
    /// An empty result list is a valid outcome, not an error.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> QuorumResult<Retrieval> {
        debug!(query = %query, top_k, "retrieving records");

        let inner = self.inner.read().await;

        let keyword_results = Self::keyword_search(&inner, query)?;
        let vector_results = self.vector_search(&inner, query, top_k)?;

        let mut results = Self::merge_results(keyword_results, vector_results);
        let count = results.len();
        results.truncate(top_k);

        debug!(count, returned = results.len(), "retrieval complete");

        Ok(Retrieval {
            results,
            count,
            query: query.to_string(),
        })
    }

    /// Retrieve with the default result limit.
    pub async fn retrieve_default(&self, query: &str) -> QuorumResult<Retrieval> {
        self.retrieve(query, DEFAULT_TOP_K).await
    }

    /// Keyword pass: exact-substring matching against keys, serialized values
    /// and the interaction log, in that order. Each key is scored once, by the
    /// first rule that matched it.
    fn keyword_search(inner: &Inner, query: &str) -> QuorumResult<Vec<RankedRecord>> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();
        let content_tokens: Vec<&str> = tokens
            .iter()
            .copied()
            .filter(|token| token.len() > CONTENT_TOKEN_MIN_LEN)
            .collect();

        let mut results = Vec::new();
        let mut matched: HashSet<String> = HashSet::new();

        for (key, record) in &inner.knowledge {
            let key_lower = key.to_lowercase();
            if tokens.iter().any(|token| key_lower.contains(token)) {
                matched.insert(key.clone());
                results.push(RankedRecord {
                    record: record.clone(),
                    match_kind: MatchKind::KeywordKey,
                    score: KEY_MATCH_SCORE,
                });
                continue;
            }

            let value_text = serde_json::to_string(&record.value)
                .map_err(|e| QuorumError::serialization("keyword_search_value", e))?
                .to_lowercase();
            if content_tokens.iter().any(|token| value_text.contains(token)) {
                matched.insert(key.clone());
                results.push(RankedRecord {
                    record: record.clone(),
                    match_kind: MatchKind::KeywordValue,
                    score: VALUE_MATCH_SCORE,
                });
            }
        }

        // Broader pass over the log, which still holds prior values of
        // overwritten keys.
        for record in &inner.log {
            if matched.contains(&record.key) {
                continue;
            }

            let record_text = serde_json::to_string(record)
                .map_err(|e| QuorumError::serialization("keyword_search_log", e))?
                .to_lowercase();
            if content_tokens.iter().any(|token| record_text.contains(token)) {
                matched.insert(record.key.clone());
                results.push(RankedRecord {
                    record: record.clone(),
                    match_kind: MatchKind::Conversation,
                    score: LOG_MATCH_SCORE,
                });
            }
        }

        Ok(results)
    }

    /// Vector pass: cosine similarity of the query embedding against every
    /// stored embedding, keeping the `top_k` best above the threshold.
    fn vector_search(
        &self,
        inner: &Inner,
        query: &str,
        top_k: usize,
    ) -> QuorumResult<Vec<RankedRecord>> {
        if inner.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query)?;

        let mut similarities: Vec<(&String, f64)> = Vec::new();
        for (key, stored) in &inner.vectors {
            // All embeddings share the lexicon dimensionality; skip rather
            // than fail the whole search if one ever does not.
            let similarity = match query_embedding.cosine_similarity(stored) {
                Ok(similarity) => similarity,
                Err(_) => continue,
            };
            if similarity > SIMILARITY_THRESHOLD {
                similarities.push((key, similarity));
            }
        }

        similarities
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        similarities.truncate(top_k);

        Ok(similarities
            .into_iter()
            .filter_map(|(key, similarity)| {
                inner.knowledge.get(key).map(|record| RankedRecord {
                    record: record.clone(),
                    match_kind: MatchKind::Vector,
                    score: similarity,
                })
            })
            .collect())
    }

    /// Merge the two result sets into one list ranked by score.
    ///
    /// A key found by both phases keeps its keyword match kind and gets the
    /// arithmetic mean of the two scores. The sort is stable, so equal scores
    /// stay in registration order.
    fn merge_results(
        keyword_results: Vec<RankedRecord>,
        vector_results: Vec<RankedRecord>,
    ) -> Vec<RankedRecord> {
        let mut merged: Vec<RankedRecord> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for result in keyword_results {
            by_key.insert(result.record.key.clone(), merged.len());
            merged.push(result);
        }

        for result in vector_results {
            match by_key.get(&result.record.key) {
                Some(&index) => {
                    merged[index].score = (merged[index].score + result.score) / 2.0;
                }
                None => {
                    by_key.insert(result.record.key.clone(), merged.len());
                    merged.push(result);
                }
            }
        }

        merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        merged
    }

    /// Record the state of a named agent, replacing any previous state.
    pub async fn update_agent_state(
        &self,
        agent: impl Into<String>,
        mut fields: BTreeMap<String, Value>,
    ) {
        let agent = agent.into();
        debug!(agent = %agent, "updating agent state");

        fields.remove("last_updated");
        let state = AgentState {
            fields,
            last_updated: Utc::now(),
        };

        self.inner.write().await.agent_states.insert(agent, state);
    }

    /// Last recorded state of a named agent, if any.
    pub async fn agent_state(&self, agent: &str) -> Option<AgentState> {
        self.inner.read().await.agent_states.get(agent).cloned()
    }

    /// The most recent `limit` interaction log entries, oldest first.
    pub async fn conversation_history(&self, limit: usize) -> Vec<Record> {
        let inner = self.inner.read().await;
        let start = inner.log.len().saturating_sub(limit);
        inner.log[start..].to_vec()
    }

    /// Wipe records, log, embeddings and agent states. Irreversible.
    pub async fn clear_all(&self) {
        debug!("clearing all memory");

        let mut inner = self.inner.write().await;
        inner.knowledge.clear();
        inner.log.clear();
        inner.vectors.clear();
        inner.agent_states.clear();
    }

    /// Counters for the current store contents.
    pub async fn statistics(&self) -> MemoryStats {
        let inner = self.inner.read().await;
        MemoryStats {
            conversations: inner.log.len(),
            knowledge_items: inner.knowledge.len(),
            agent_states: inner.agent_states.len(),
            vectors: inner.vectors.len(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

//! # Memory subsystem
//!
//! Keyed persistence of query results with hybrid retrieval.
//!
//! Every stored record gets a timestamp, a confidence score and a
//! fixed-lexicon embedding. Retrieval runs two independent passes:
//!
//! - **Keyword**: substring matching against record keys, serialized values
//!   and the append-only interaction log
//! - **Vector**: cosine similarity between the query embedding and every
//!   stored embedding
//!
//! The passes are merged into one ranked list, averaging the scores of keys
//! found by both. The store also tracks last-reported per-agent state and the
//! chronological interaction log.

mod store;
mod vector;

pub use store::{
    AgentState, MatchKind, MemoryStats, MemoryStore, Metadata, RankedRecord, Record,
    RecordMetadata, Retrieval, StoreReceipt, DEFAULT_TOP_K,
};
pub use vector::{Embedding, LexiconEmbedder, LEXICON};

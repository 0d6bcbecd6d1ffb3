//! # Quorum Agents
//!
//! A small multi-agent chat assistant: a coordinator routes each query
//! through research lookup, optional analysis, and a memory store with
//! hybrid keyword/vector recall.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quorum_agents::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> QuorumResult<()> {
//!     let coordinator = CoordinatorAgent::new();
//!
//!     let response = coordinator
//!         .process_query("What are the main types of neural networks?")
//!         .await?;
//!     println!("{}", response);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`agent::coordinator`]: query classification and routing
//! - [`agent::research`]: lookup over the built-in knowledge base
//! - [`agent::analysis`]: templated reasoning over research results
//! - [`agent::memory`]: keyed records, embeddings and hybrid retrieval
//! - [`journal`]: JSON-lines session transcript

#![warn(missing_docs)]

pub mod agent;
pub mod error;
pub mod journal;

pub use agent::coordinator::CoordinatorAgent;
pub use error::{QuorumError, QuorumResult};

/// Commonly used types
pub mod prelude {
    pub use crate::agent::analysis::{AnalysisAgent, AnalysisOutcome};
    pub use crate::agent::coordinator::{Complexity, CoordinatorAgent};
    pub use crate::agent::memory::{
        MatchKind, MemoryStats, MemoryStore, Metadata, RankedRecord, Record, Retrieval,
    };
    pub use crate::agent::research::{ResearchAgent, ResearchOutcome, TopicHit};
    pub use crate::error::{QuorumError, QuorumResult};
    pub use crate::journal::{generate_session_id, SessionJournal};
}

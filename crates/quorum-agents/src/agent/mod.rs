//! # Agent components
//!
//! The coordinator classifies each query and orchestrates the workers:
//!
//! - **Research**: lookup over the built-in knowledge base
//! - **Analysis**: templated reasoning over research results
//! - **Memory**: keyed record store with hybrid keyword/vector recall
//!
//! ## Example
//!
//! ```rust,no_run
//! use quorum_agents::agent::CoordinatorAgent;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = CoordinatorAgent::new();
//!
//! let response = coordinator
//!     .process_query("What are the main types of neural networks?")
//!     .await?;
//! println!("{}", response);
//!
//! // Resolved queries land in memory and can be recalled later
//! let recall = coordinator
//!     .process_query("What did we discuss about neural networks earlier?")
//!     .await?;
//! println!("{}", recall);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod coordinator;
pub mod memory;
pub mod research;

pub use analysis::{AnalysisAgent, AnalysisOutcome};
pub use coordinator::{Complexity, CoordinatorAgent};
pub use memory::MemoryStore;
pub use research::{ResearchAgent, ResearchOutcome, TopicHit};

/// Cut a string down to at most `max_len` characters, on a char boundary.
pub(crate) fn truncate_chars(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

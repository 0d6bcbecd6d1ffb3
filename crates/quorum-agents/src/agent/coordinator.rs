//! Coordinator agent - classifies queries and orchestrates the workers
//!
//! Every query is first checked for memory recall, then classified by
//! complexity and routed through research, analysis, or the full multi-step
//! pipeline. Resolved queries are stored back into memory for later recall.

use crate::agent::analysis::AnalysisAgent;
use crate::agent::memory::{MemoryStore, Metadata, RankedRecord};
use crate::agent::research::{ResearchAgent, TopicHit};
use crate::agent::truncate_chars;
use crate::error::{QuorumError, QuorumResult};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

const MEMORY_KEYWORDS: [&str; 8] = [
    "what did",
    "earlier",
    "discussed",
    "learned",
    "talked about",
    "previous",
    "before",
    "remember",
];

const COMPLEX_KEYWORDS: [&str; 7] = [
    "analyze",
    "compare",
    "research",
    "identify",
    "summarize",
    "tradeoffs",
    "evaluate",
];

const MULTISTEP_KEYWORDS: [&str; 7] = [
    "and then",
    "after that",
    "recommend",
    "find and analyze",
    "first",
    "next",
    "finally",
];

/// How involved a query is, deciding which workers get involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    /// Research only
    Simple,
    /// Research plus analysis
    Complex,
    /// Research, analysis and synthesis
    MultiStep,
}

/// Agent orchestrating research, analysis and memory.
pub struct CoordinatorAgent {
    research: ResearchAgent,
    analysis: AnalysisAgent,
    memory: Arc<MemoryStore>,
}

impl CoordinatorAgent {
    /// Create a coordinator with a fresh memory store
    pub fn new() -> Self {
        Self::with_memory(Arc::new(MemoryStore::new()))
    }

    /// Create a coordinator sharing an existing memory store
    pub fn with_memory(memory: Arc<MemoryStore>) -> Self {
        Self {
            research: ResearchAgent::new(),
            analysis: AnalysisAgent::new(),
            memory,
        }
    }

    /// The shared memory store
    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// Process a user query and produce the response text.
    pub async fn process_query(&self, query: &str) -> QuorumResult<String> {
        info!(query = %query, "processing query");

        if Self::is_memory_query(query) {
            info!("routing to memory recall");
            return self.handle_memory_query(query).await;
        }

        let complexity = Self::classify_complexity(query);
        info!(?complexity, "classified query");

        match complexity {
            Complexity::Simple => self.handle_simple_query(query).await,
            Complexity::Complex => self.handle_complex_query(query).await,
            Complexity::MultiStep => self.handle_multistep_query(query).await,
        }
    }

    /// Whether the query asks about past conversations.
    pub fn is_memory_query(query: &str) -> bool {
        let query_lower = query.to_lowercase();
        MEMORY_KEYWORDS.iter().any(|kw| query_lower.contains(kw))
    }

    /// Classify a query by counting operation keywords.
    pub fn classify_complexity(query: &str) -> Complexity {
        let query_lower = query.to_lowercase();

        let complex_count = COMPLEX_KEYWORDS
            .iter()
            .filter(|kw| query_lower.contains(*kw))
            .count();
        let has_multistep = MULTISTEP_KEYWORDS.iter().any(|kw| query_lower.contains(kw));

        if has_multistep || complex_count >= 2 {
            Complexity::MultiStep
        } else if complex_count >= 1 {
            Complexity::Complex
        } else {
            Complexity::Simple
        }
    }

    async fn handle_memory_query(&self, query: &str) -> QuorumResult<String> {
        let retrieval = self.memory.retrieve_default(query).await?;

        if retrieval.results.is_empty() {
            return Ok(
                "I couldn't find any previous discussions on that topic. Try asking something else!"
                    .to_string(),
            );
        }

        let mut response = format!(
            "I found {} relevant items from our previous discussions:\n\n",
            retrieval.count
        );

        for (idx, result) in retrieval.results.iter().take(5).enumerate() {
            response.push_str(&format!("{}. Topic: {}\n", idx + 1, result.record.key));
            response.push_str(&format!(
                "   Timestamp: {}\n",
                result.record.metadata.timestamp.to_rfc3339()
            ));
            response.push_str(&format!(
                "   Confidence: {:.2}\n",
                result.record.metadata.confidence
            ));
            response.push_str(&Self::summarize_value(result));
            response.push('\n');
        }

        Ok(response)
    }

    /// One-line summary of a recalled payload, by shape.
    fn summarize_value(result: &RankedRecord) -> String {
        let mut summary = String::new();

        if let Some(object) = result.record.value.as_object() {
            if let Some(research) = object.get("research").and_then(|v| v.as_array()) {
                summary.push_str(&format!("   Research findings: {} topics\n", research.len()));
            }
            if let Some(analysis) = object.get("analysis").and_then(|v| v.as_str()) {
                summary.push_str(&format!("   Analysis: {}...\n", truncate_chars(analysis, 100)));
            }
        } else if let Some(items) = result.record.value.as_array() {
            summary.push_str(&format!("   Contains {} items\n", items.len()));
        }

        summary
    }

    /// Research only: look the topic up and store the findings.
    async fn handle_simple_query(&self, query: &str) -> QuorumResult<String> {
        debug!("simple query: research only");

        let research = self.research.search(query)?;

        if research.data.is_empty() {
            return Ok(
                "I couldn't find information on that topic in the knowledge base. Try rephrasing your question."
                    .to_string(),
            );
        }

        let mut response = String::from("Here's what I found:\n\n");

        for hit in &research.data {
            response.push_str(&format!("{}\n", hit.topic.to_uppercase()));
            response.push_str(&format!("{}\n", "-".repeat(50)));

            if let Some(types) = hit.data.get("types").and_then(|v| v.as_array()) {
                response.push_str("Types:\n");
                for item in types.iter().filter_map(|t| t.as_str()) {
                    response.push_str(&format!("  - {}\n", item));
                }
            }

            if let Some(description) = hit.data.get("description").and_then(|v| v.as_str()) {
                response.push_str(&format!("\nDescription: {}\n", description));
            }

            if let Some(techniques) = hit.data.get("techniques").and_then(|v| v.as_array()) {
                response.push_str("Techniques:\n");
                for item in techniques.iter().filter_map(|t| t.as_str()) {
                    response.push_str(&format!("  - {}\n", item));
                }
            }

            response.push('\n');
        }

        self.memory
            .store(
                query,
                Self::hits_value(&research.data)?,
                Metadata::new()
                    .with_confidence(research.confidence)
                    .with_field("agent", "research")
                    .with_field("query_type", "simple"),
            )
            .await?;

        Ok(response)
    }

    /// Research plus analysis, stored as one composite record.
    async fn handle_complex_query(&self, query: &str) -> QuorumResult<String> {
        debug!("complex query: research and analysis");

        let research = self.research.search(query)?;

        if research.data.is_empty() {
            return Ok(
                "I couldn't find sufficient information to analyze. Try a different question."
                    .to_string(),
            );
        }

        let analysis = self.analysis.analyze(&research.data, query);

        let mut response = String::from("RESEARCH & ANALYSIS RESULTS\n");
        response.push_str(&format!("{}\n\n", "=".repeat(70)));

        response.push_str("RESEARCH FINDINGS:\n");
        response.push_str(&format!("{}\n", "-".repeat(70)));
        for hit in &research.data {
            response.push_str(&format!("  - {}\n", hit.topic));
        }

        response.push_str("\nANALYSIS:\n");
        response.push_str(&format!("{}\n", "-".repeat(70)));
        response.push_str(&analysis.analysis);

        response.push_str(&format!(
            "\n\nConfidence Score: {:.2}\n",
            analysis.confidence
        ));

        self.memory
            .store(
                query,
                json!({
                    "research": Self::hits_value(&research.data)?,
                    "analysis": analysis.analysis,
                }),
                Metadata::new()
                    .with_confidence((research.confidence + analysis.confidence) / 2.0)
                    .with_field("agents", json!(["research", "analysis"]))
                    .with_field("query_type", "complex"),
            )
            .await?;

        Ok(response)
    }

    /// Full pipeline with an explicit synthesis step.
    async fn handle_multistep_query(&self, query: &str) -> QuorumResult<String> {
        debug!("multi-step query: full pipeline");

        let mut response = String::from("MULTI-STEP ANALYSIS\n");
        response.push_str(&format!("{}\n\n", "=".repeat(70)));

        response.push_str("STEP 1: RESEARCH\n");
        response.push_str(&format!("{}\n", "-".repeat(70)));

        let research = self.research.search(query)?;

        if research.data.is_empty() {
            response.push_str("  - No data found\n");
        } else {
            for hit in &research.data {
                response.push_str(&format!("  - Found: {}\n", hit.topic));
            }
        }

        response.push_str("\nSTEP 2: ANALYSIS\n");
        response.push_str(&format!("{}\n", "-".repeat(70)));

        let analysis = if research.data.is_empty() {
            response.push_str("  - Cannot analyze without data\n");
            crate::agent::analysis::AnalysisOutcome {
                analysis: "No analysis performed".to_string(),
                confidence: 0.0,
            }
        } else {
            let analysis = self.analysis.analyze(&research.data, query);
            response.push_str(&analysis.analysis);
            analysis
        };

        response.push_str("\nSTEP 3: SYNTHESIS & RECOMMENDATIONS\n");
        response.push_str(&format!("{}\n", "-".repeat(70)));

        if query.to_lowercase().contains("recommend") {
            response.push_str("Based on the research and analysis:\n\n");
            response.push_str("  - Consider the tradeoffs identified above\n");
            response.push_str("  - The best approach depends on your specific requirements\n");
            response.push_str("  - Evaluate based on your use case constraints\n");
        } else {
            response.push_str("Key findings have been analyzed and stored.\n");
            response.push_str("You can ask follow-up questions or request memory recall.\n");
        }

        self.memory
            .store(
                query,
                json!({
                    "research": Self::hits_value(&research.data)?,
                    "analysis": analysis.analysis,
                    "type": "multi-step",
                }),
                Metadata::new()
                    .with_confidence(0.85)
                    .with_field("agents", json!(["research", "analysis", "memory"]))
                    .with_field("query_type", "multi-step"),
            )
            .await?;

        Ok(response)
    }

    fn hits_value(hits: &[TopicHit]) -> QuorumResult<serde_json::Value> {
        serde_json::to_value(hits).map_err(|e| QuorumError::serialization("store_research_hits", e))
    }
}

impl Default for CoordinatorAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_complexity() {
        assert_eq!(
            CoordinatorAgent::classify_complexity("What are the main types of neural networks?"),
            Complexity::Simple
        );
        assert_eq!(
            CoordinatorAgent::classify_complexity("Analyze neural networks"),
            Complexity::Complex
        );
        // Two operation keywords push a query to the full pipeline
        assert_eq!(
            CoordinatorAgent::classify_complexity(
                "Research transformer architectures, analyze their computational efficiency, and summarize key trade-offs."
            ),
            Complexity::MultiStep
        );
        // A staging phrase alone is enough
        assert_eq!(
            CoordinatorAgent::classify_complexity(
                "Compare machine learning optimization techniques and recommend which is better."
            ),
            Complexity::MultiStep
        );
    }

    #[test]
    fn test_is_memory_query() {
        assert!(CoordinatorAgent::is_memory_query(
            "What did we discuss about neural networks earlier?"
        ));
        assert!(CoordinatorAgent::is_memory_query("Do you remember transformers?"));
        assert!(!CoordinatorAgent::is_memory_query(
            "What are the main types of neural networks?"
        ));
    }

    #[tokio::test]
    async fn test_simple_query_responds_and_stores() {
        let coordinator = CoordinatorAgent::new();

        let response = coordinator
            .process_query("What are the main types of neural networks?")
            .await
            .unwrap();

        assert!(response.contains("Here's what I found:"));
        assert!(response.contains("NEURAL NETWORKS"));
        assert!(response.contains("Convolutional Neural Networks (CNN)"));

        let stats = coordinator.memory().statistics().await;
        assert_eq!(stats.knowledge_items, 1);
        assert_eq!(stats.vectors, 1);

        let history = coordinator.memory().conversation_history(1).await;
        assert_eq!(
            history[0].metadata.extra.get("query_type"),
            Some(&json!("simple"))
        );
    }

    #[tokio::test]
    async fn test_simple_query_without_data() {
        let coordinator = CoordinatorAgent::new();

        let response = coordinator.process_query("zzzz qqqq").await.unwrap();

        assert!(response.contains("couldn't find information"));
        let stats = coordinator.memory().statistics().await;
        assert_eq!(stats.knowledge_items, 0);
    }

    #[tokio::test]
    async fn test_complex_query_includes_analysis() {
        let coordinator = CoordinatorAgent::new();

        let response = coordinator
            .process_query("Analyze transformer architectures efficiency")
            .await
            .unwrap();

        assert!(response.contains("RESEARCH & ANALYSIS RESULTS"));
        assert!(response.contains("RESEARCH FINDINGS:"));
        assert!(response.contains("TRADEOFF ANALYSIS:"));
        assert!(response.contains("Confidence Score: 0.80"));

        let history = coordinator.memory().conversation_history(1).await;
        assert_eq!(
            history[0].metadata.extra.get("query_type"),
            Some(&json!("complex"))
        );
        assert!(history[0].value.get("analysis").is_some());
    }

    #[tokio::test]
    async fn test_multistep_query_runs_all_stages() {
        let coordinator = CoordinatorAgent::new();

        let response = coordinator
            .process_query(
                "Compare machine learning optimization techniques and recommend which is better.",
            )
            .await
            .unwrap();

        assert!(response.contains("MULTI-STEP ANALYSIS"));
        assert!(response.contains("STEP 1: RESEARCH"));
        assert!(response.contains("STEP 2: ANALYSIS"));
        assert!(response.contains("STEP 3: SYNTHESIS & RECOMMENDATIONS"));
        assert!(response.contains("Based on the research and analysis:"));

        let history = coordinator.memory().conversation_history(1).await;
        assert_eq!(
            history[0].metadata.extra.get("query_type"),
            Some(&json!("multi-step"))
        );
        assert_eq!(history[0].metadata.confidence, 0.85);
    }

    #[tokio::test]
    async fn test_memory_recall_after_simple_query() {
        let coordinator = CoordinatorAgent::new();

        coordinator
            .process_query("What are the main types of neural networks?")
            .await
            .unwrap();

        let response = coordinator
            .process_query("What did we discuss about neural networks earlier?")
            .await
            .unwrap();

        assert!(response.contains("relevant items from our previous discussions"));
        assert!(response.contains("Topic: What are the main types of neural networks?"));
        // The stored payload is the research hit list (neural networks plus
        // the deep-learning topic matched through its content)
        assert!(response.contains("Contains 2 items"));
    }

    #[tokio::test]
    async fn test_memory_recall_with_empty_store() {
        let coordinator = CoordinatorAgent::new();

        let response = coordinator
            .process_query("What did we discuss about transformers earlier?")
            .await
            .unwrap();

        assert!(response.contains("couldn't find any previous discussions"));
    }
}

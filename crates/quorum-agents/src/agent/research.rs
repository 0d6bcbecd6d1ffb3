//! Research agent - information retrieval over the built-in knowledge base
//!
//! Lookups run against a fixed topic base standing in for a real data source.
//! Results are ranked by a small relevance heuristic over topic names and
//! serialized topic content.

use crate::error::{QuorumError, QuorumResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Relevance cap so one topic cannot dominate purely on word overlap.
const MAX_RELEVANCE: f64 = 2.0;

/// Confidence reported when at least one topic matched.
const HIT_CONFIDENCE: f64 = 0.9;

/// Confidence reported for an empty result.
const MISS_CONFIDENCE: f64 = 0.3;

/// A matched topic with its structured content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicHit {
    /// Topic name as registered in the knowledge base
    pub topic: String,

    /// The topic's structured content
    pub data: Value,

    /// Ranking score for this query
    pub relevance: f64,
}

/// Outcome of a knowledge-base search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutcome {
    /// Matched topics, most relevant first
    pub data: Vec<TopicHit>,

    /// Overall confidence in the result set
    pub confidence: f64,

    /// Where the data came from
    pub source: String,

    /// The query that produced this outcome
    pub query: String,
}

/// Agent answering queries from the built-in topic base.
pub struct ResearchAgent {
    knowledge_base: BTreeMap<String, Value>,
}

impl ResearchAgent {
    /// Create a research agent with the built-in topics
    pub fn new() -> Self {
        Self {
            knowledge_base: Self::initialize_knowledge_base(),
        }
    }

    fn initialize_knowledge_base() -> BTreeMap<String, Value> {
        let mut kb = BTreeMap::new();

        kb.insert(
            "neural networks".to_string(),
            json!({
                "types": [
                    "Feedforward Neural Networks (FNN)",
                    "Convolutional Neural Networks (CNN)",
                    "Recurrent Neural Networks (RNN)",
                    "Long Short-Term Memory (LSTM)",
                    "Generative Adversarial Networks (GAN)",
                    "Transformer Networks",
                    "Autoencoders"
                ],
                "description": "Neural networks are computing systems inspired by biological neural networks that constitute animal brains. They consist of interconnected nodes (neurons) that process information.",
                "applications": ["Image recognition", "Natural language processing", "Speech recognition", "Game playing"]
            }),
        );

        kb.insert(
            "machine learning optimization".to_string(),
            json!({
                "techniques": [
                    "Gradient Descent",
                    "Stochastic Gradient Descent (SGD)",
                    "Mini-batch Gradient Descent",
                    "Adam Optimizer",
                    "RMSprop",
                    "AdaGrad",
                    "AdaDelta",
                    "Momentum"
                ],
                "effectiveness": "Adam optimizer is generally most effective for deep learning due to adaptive learning rates. SGD with momentum works well for general cases and has good convergence properties.",
                "description": "Optimization techniques adjust model parameters to minimize loss functions during training."
            }),
        );

        kb.insert(
            "transformer architectures".to_string(),
            json!({
                "info": "Transformers use self-attention mechanisms to process sequences in parallel, enabling better capture of long-range dependencies.",
                "efficiency": "High computational cost (O(n^2) complexity) but excellent parallelization capabilities. Training is resource-intensive but inference can be optimized.",
                "tradeoffs": "Memory intensive and requires large datasets, but captures long-range dependencies better than RNNs and processes sequences in parallel.",
                "examples": ["BERT", "GPT", "T5", "Vision Transformer (ViT)"],
                "key_components": ["Self-attention", "Multi-head attention", "Positional encoding", "Feed-forward networks"]
            }),
        );

        kb.insert(
            "reinforcement learning".to_string(),
            json!({
                "papers": [
                    "Q-Learning for Robotics Control",
                    "Deep Q-Networks (DQN) - Atari Games",
                    "Policy Gradient Methods in Continuous Control",
                    "Actor-Critic Approaches for RL",
                    "Proximal Policy Optimization (PPO)",
                    "Trust Region Policy Optimization (TRPO)"
                ],
                "methodologies": [
                    "Model-free learning (direct policy/value learning)",
                    "Model-based learning (learn environment model)",
                    "Value-based methods (Q-learning, DQN)",
                    "Policy-based methods (REINFORCE, PPO)",
                    "Actor-Critic methods (A3C, SAC)",
                    "Multi-agent RL"
                ],
                "challenges": [
                    "Sample efficiency - requires many interactions",
                    "Exploration vs exploitation tradeoff",
                    "Credit assignment problem",
                    "Reward design and shaping",
                    "Stability and convergence issues",
                    "Partial observability",
                    "Non-stationary environments"
                ],
                "applications": ["Robotics", "Game AI", "Autonomous vehicles", "Resource management"]
            }),
        );

        kb.insert(
            "deep learning".to_string(),
            json!({
                "description": "Deep learning uses neural networks with multiple layers to progressively extract higher-level features from raw input.",
                "techniques": ["Backpropagation", "Dropout", "Batch normalization", "Transfer learning"],
                "frameworks": ["TensorFlow", "PyTorch", "Keras", "JAX"]
            }),
        );

        kb.insert(
            "computer vision".to_string(),
            json!({
                "tasks": ["Image classification", "Object detection", "Semantic segmentation", "Instance segmentation"],
                "architectures": ["ResNet", "VGG", "YOLO", "Mask R-CNN", "EfficientNet"],
                "applications": ["Facial recognition", "Medical imaging", "Autonomous driving", "Quality control"]
            }),
        );

        kb.insert(
            "natural language processing".to_string(),
            json!({
                "tasks": ["Text classification", "Named entity recognition", "Machine translation", "Question answering"],
                "models": ["BERT", "GPT", "T5", "RoBERTa", "ELECTRA"],
                "challenges": ["Ambiguity", "Context understanding", "Multi-lingual support"]
            }),
        );

        kb
    }

    /// Search the knowledge base, ranking matched topics by relevance.
    pub fn search(&self, query: &str) -> QuorumResult<ResearchOutcome> {
        debug!(query = %query, "searching knowledge base");

        let query_lower = query.to_lowercase();
        let mut hits = Vec::new();

        for (topic, data) in &self.knowledge_base {
            let data_text = serde_json::to_string(data)
                .map_err(|e| QuorumError::serialization("search_topic_data", e))?
                .to_lowercase();

            if Self::is_relevant(&query_lower, topic, &data_text) {
                hits.push(TopicHit {
                    topic: topic.clone(),
                    data: data.clone(),
                    relevance: Self::relevance(&query_lower, topic, &data_text),
                });
            }
        }

        hits.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let confidence = if hits.is_empty() {
            MISS_CONFIDENCE
        } else {
            HIT_CONFIDENCE
        };

        debug!(hits = hits.len(), confidence, "knowledge base search complete");

        Ok(ResearchOutcome {
            data: hits,
            confidence,
            source: "knowledge_base".to_string(),
            query: query.to_string(),
        })
    }

    /// Structured content for an exact topic name, if registered.
    pub fn topic_details(&self, topic: &str) -> Option<Value> {
        debug!(topic = %topic, "fetching topic details");
        self.knowledge_base.get(&topic.to_lowercase()).cloned()
    }

    fn is_relevant(query: &str, topic: &str, data_text: &str) -> bool {
        // Direct topic match, or any topic word appearing in the query
        if query.contains(topic) || topic.split_whitespace().any(|word| query.contains(word)) {
            return true;
        }

        // Otherwise at least one significant query word must appear in the
        // topic content
        query
            .split_whitespace()
            .filter(|word| word.len() > 3)
            .any(|word| data_text.contains(word))
    }

    fn relevance(query: &str, topic: &str, data_text: &str) -> f64 {
        let mut score = 0.0;

        if query.contains(topic) {
            score += 1.0;
        }

        let query_words: Vec<&str> = query.split_whitespace().collect();
        let matching_words = topic
            .split_whitespace()
            .filter(|word| query_words.contains(word))
            .count();
        score += matching_words as f64 * 0.3;

        for word in &query_words {
            if word.len() > 3 && data_text.contains(word) {
                score += 0.1;
            }
        }

        score.min(MAX_RELEVANCE)
    }
}

impl Default for ResearchAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_exact_topic() {
        let agent = ResearchAgent::new();

        let outcome = agent
            .search("what are the main types of neural networks?")
            .unwrap();

        assert!(!outcome.data.is_empty());
        assert_eq!(outcome.data[0].topic, "neural networks");
        assert!(outcome.data[0].relevance >= 1.0);
        assert_eq!(outcome.confidence, 0.9);
        assert_eq!(outcome.source, "knowledge_base");
    }

    #[test]
    fn test_search_no_match_keeps_low_confidence() {
        let agent = ResearchAgent::new();

        let outcome = agent.search("zzzz qqqq").unwrap();

        assert!(outcome.data.is_empty());
        assert_eq!(outcome.confidence, 0.3);
    }

    #[test]
    fn test_search_ranks_exact_topic_first() {
        let agent = ResearchAgent::new();

        // "learning" alone matches several topics; the full topic phrase must
        // outrank the partial overlaps.
        let outcome = agent
            .search("research reinforcement learning methodologies")
            .unwrap();

        assert!(outcome.data.len() > 1);
        assert_eq!(outcome.data[0].topic, "reinforcement learning");
        for pair in outcome.data.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
    }

    #[test]
    fn test_relevance_is_capped() {
        let agent = ResearchAgent::new();

        let outcome = agent
            .search("reinforcement learning policy gradient papers methodologies challenges robotics")
            .unwrap();

        assert!(outcome.data.iter().all(|hit| hit.relevance <= 2.0));
    }

    #[test]
    fn test_topic_details_lookup() {
        let agent = ResearchAgent::new();

        let details = agent.topic_details("Deep Learning").unwrap();
        assert!(details.get("frameworks").is_some());

        assert!(agent.topic_details("unknown topic").is_none());
    }
}

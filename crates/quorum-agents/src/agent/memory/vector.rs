//! Vector embeddings and similarity math for memory retrieval
//!
//! Embeddings are bag-of-words vectors over a fixed domain lexicon. Each
//! dimension counts how many tokens of the input contain the corresponding
//! lexicon term as a substring, scaled by a constant weight and L2-normalized.

use crate::error::{QuorumError, QuorumResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed, ordered vocabulary defining the embedding dimensions.
///
/// The order is load-bearing: vectors are only comparable because every
/// embedder in the process indexes into the same sequence.
pub const LEXICON: [&str; 104] = [
    "neural",
    "network",
    "learning",
    "deep",
    "machine",
    "data",
    "model",
    "training",
    "optimization",
    "gradient",
    "descent",
    "transformer",
    "attention",
    "layer",
    "algorithm",
    "classification",
    "regression",
    "supervised",
    "unsupervised",
    "reinforcement",
    "cnn",
    "rnn",
    "lstm",
    "gan",
    "autoencoder",
    "embedding",
    "feature",
    "backpropagation",
    "loss",
    "accuracy",
    "precision",
    "recall",
    "f1",
    "score",
    "overfitting",
    "underfitting",
    "regularization",
    "dropout",
    "batch",
    "normalization",
    "activation",
    "relu",
    "sigmoid",
    "softmax",
    "convolutional",
    "recurrent",
    "feedforward",
    "architecture",
    "weights",
    "bias",
    "parameter",
    "hyperparameter",
    "epoch",
    "tensorflow",
    "pytorch",
    "keras",
    "vision",
    "nlp",
    "speech",
    "image",
    "text",
    "sequence",
    "time",
    "series",
    "prediction",
    "inference",
    "deployment",
    "research",
    "paper",
    "study",
    "experiment",
    "dataset",
    "preprocessing",
    "augmentation",
    "transfer",
    "fine",
    "tuning",
    "pretrained",
    "bert",
    "gpt",
    "t5",
    "roberta",
    "xlnet",
    "efficientnet",
    "resnet",
    "vgg",
    "yolo",
    "mask",
    "rcnn",
    "segmentation",
    "detection",
    "recognition",
    "generation",
    "synthesis",
    "style",
    "adversarial",
    "q-learning",
    "policy",
    "value",
    "reward",
    "agent",
    "environment",
    "state",
    "action",
];

/// A vector embedding (dense float vector)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    /// The vector dimensions
    pub vector: Vec<f64>,

    /// Dimensionality of the embedding
    pub dimensions: usize,
}

impl Embedding {
    /// Create a new embedding
    pub fn new(vector: Vec<f64>) -> Self {
        let dimensions = vector.len();
        Self { vector, dimensions }
    }

    /// Calculate cosine similarity with another embedding.
    ///
    /// Returns exactly `0.0` when either vector has zero norm.
    pub fn cosine_similarity(&self, other: &Embedding) -> QuorumResult<f64> {
        if self.dimensions != other.dimensions {
            return Err(QuorumError::validation(
                "embedding_dimensions",
                "dimensions must match",
                format!("{} vs {}", self.dimensions, other.dimensions),
            ));
        }

        let dot_product: f64 = self
            .vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a * b)
            .sum();

        let norm_a: f64 = self.vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b: f64 = other.vector.iter().map(|x| x * x).sum::<f64>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }

        Ok(dot_product / (norm_a * norm_b))
    }

    /// L2 norm of the vector
    pub fn norm(&self) -> f64 {
        self.vector.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// Embedder producing bag-of-words vectors over [`LEXICON`].
///
/// Deliberately simple: no learned weights, no document-frequency component.
/// The per-term weight `1 + ln(1 + N)` is constant for a fixed lexicon, so it
/// cancels under normalization; it is kept for parity with the stated scoring
/// formula.
#[derive(Debug, Clone)]
pub struct LexiconEmbedder {
    weight: f64,
}

impl LexiconEmbedder {
    /// Create a new embedder over the fixed lexicon
    pub fn new() -> Self {
        Self {
            weight: 1.0 + (1.0 + LEXICON.len() as f64).ln(),
        }
    }

    /// Embedding dimensionality (the lexicon size)
    pub fn dimensions(&self) -> usize {
        LEXICON.len()
    }

    /// Embed a text together with a structured payload.
    ///
    /// The payload is folded in through its canonical JSON serialization, so
    /// nested values contribute their textual content to the vector.
    pub fn embed(&self, text: &str, payload: &Value) -> QuorumResult<Embedding> {
        let payload_text = serde_json::to_string(payload)
            .map_err(|e| QuorumError::serialization("embed_payload", e))?;

        let full_text = format!("{} {}", text, payload_text).to_lowercase();
        let words: Vec<&str> = full_text.split_whitespace().collect();

        let mut vector = vec![0.0; LEXICON.len()];
        for (i, term) in LEXICON.iter().enumerate() {
            let count = words.iter().filter(|word| word.contains(term)).count();
            vector[i] = count as f64 * self.weight;
        }

        let norm: f64 = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for component in &mut vector {
                *component /= norm;
            }
        }

        Ok(Embedding::new(vector))
    }

    /// Embed a free-form query string.
    ///
    /// The query serves as both the text and the payload, mirroring how
    /// records fold their key and value together.
    pub fn embed_query(&self, query: &str) -> QuorumResult<Embedding> {
        self.embed(query, &Value::String(query.to_string()))
    }
}

impl Default for LexiconEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cosine_similarity_identical_and_orthogonal() {
        let emb1 = Embedding::new(vec![1.0, 0.0, 0.0]);
        let emb2 = Embedding::new(vec![1.0, 0.0, 0.0]);
        let emb3 = Embedding::new(vec![0.0, 1.0, 0.0]);

        // Identical vectors
        let sim = emb1.cosine_similarity(&emb2).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);

        // Orthogonal vectors
        let sim = emb1.cosine_similarity(&emb3).unwrap();
        assert!(sim.abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_symmetric_and_bounded() {
        let a = Embedding::new(vec![0.3, 0.7, 0.1, 0.9]);
        let b = Embedding::new(vec![0.5, 0.2, 0.8, 0.4]);

        let ab = a.cosine_similarity(&b).unwrap();
        let ba = b.cosine_similarity(&a).unwrap();

        assert_eq!(ab, ba);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_similarity_zero_vector_is_zero() {
        let zero = Embedding::new(vec![0.0, 0.0, 0.0]);
        let other = Embedding::new(vec![1.0, 2.0, 3.0]);

        assert_eq!(zero.cosine_similarity(&other).unwrap(), 0.0);
        assert_eq!(other.cosine_similarity(&zero).unwrap(), 0.0);
        assert_eq!(zero.cosine_similarity(&zero).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);

        assert!(a.cosine_similarity(&b).is_err());
    }

    #[test]
    fn test_embed_counts_substring_tokens() {
        let embedder = LexiconEmbedder::new();

        // "networks" contains the term "network", so the token still counts
        let emb = embedder
            .embed("neural networks", &json!(["CNN", "RNN"]))
            .unwrap();

        assert_eq!(emb.dimensions, LEXICON.len());
        assert!(emb.vector[0] > 0.0); // "neural"
        assert!(emb.vector[1] > 0.0); // "network" via "networks"
        assert!((emb.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_embed_unknown_text_is_zero_vector() {
        let embedder = LexiconEmbedder::new();

        let emb = embedder.embed("completely unrelated words", &json!({})).unwrap();

        assert_eq!(emb.norm(), 0.0);
        assert!(emb.vector.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_embed_query_matches_string_payload() {
        let embedder = LexiconEmbedder::new();

        let from_query = embedder.embed_query("deep learning").unwrap();
        let from_embed = embedder
            .embed("deep learning", &Value::String("deep learning".to_string()))
            .unwrap();

        assert_eq!(from_query.vector, from_embed.vector);
    }

    #[test]
    fn test_similar_texts_have_higher_similarity() {
        let embedder = LexiconEmbedder::new();

        let emb1 = embedder.embed_query("neural network training").unwrap();
        let emb2 = embedder.embed_query("training deep neural networks").unwrap();
        let emb3 = embedder.embed_query("reinforcement policy reward").unwrap();

        let sim_close = emb1.cosine_similarity(&emb2).unwrap();
        let sim_far = emb1.cosine_similarity(&emb3).unwrap();

        assert!(
            sim_close > sim_far,
            "related texts should score higher: {} vs {}",
            sim_close,
            sim_far
        );
    }
}

//! Analysis agent - templated reasoning over research results
//!
//! Builds sectioned plain-text reports from already-fetched topic data. The
//! kind of report is picked from keywords in the analysis request.

use crate::agent::research::TopicHit;
use crate::agent::truncate_chars;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of an analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// The assembled report
    pub analysis: String,

    /// Confidence in the report
    pub confidence: f64,
}

/// Agent producing templated analyses of research data.
pub struct AnalysisAgent;

impl AnalysisAgent {
    /// Create an analysis agent
    pub fn new() -> Self {
        Self
    }

    /// Analyze topic data, choosing the report kind from the request text.
    pub fn analyze(&self, data: &[TopicHit], analysis_type: &str) -> AnalysisOutcome {
        debug!(request = %analysis_type, topics = data.len(), "analyzing data");

        if data.is_empty() {
            return AnalysisOutcome {
                analysis: "No data provided for analysis".to_string(),
                confidence: 0.0,
            };
        }

        let request = analysis_type.to_lowercase();

        if request.contains("compare") || request.contains("effectiveness") {
            Self::compare_data(data)
        } else if request.contains("efficiency") || request.contains("tradeoff") {
            Self::analyze_tradeoffs(data)
        } else if request.contains("challenge")
            || request.contains("methodology")
            || request.contains("identify")
        {
            Self::identify_patterns(data)
        } else if request.contains("recommend") {
            Self::generate_recommendations(data)
        } else {
            Self::general_analysis(data)
        }
    }

    /// Confidence heuristic: more topics and a longer report raise it.
    pub fn estimate_confidence(&self, data: &[TopicHit], analysis: &str) -> f64 {
        let mut confidence = 0.5;

        confidence += (data.len() as f64 * 0.1).min(0.3);

        if analysis.len() > 500 {
            confidence += 0.2;
        }

        confidence.min(1.0)
    }

    fn compare_data(data: &[TopicHit]) -> AnalysisOutcome {
        let mut analysis = String::from("COMPARISON ANALYSIS:\n\n");

        for hit in data {
            analysis.push_str(&format!("{}:\n", hit.topic.to_uppercase()));

            if let Some(effectiveness) = hit.data.get("effectiveness").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("  - Effectiveness: {}\n", effectiveness));
            }

            if let Some(efficiency) = hit.data.get("efficiency").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("  - Efficiency: {}\n", efficiency));
            }

            if let Some(techniques) = hit.data.get("techniques").and_then(|v| v.as_array()) {
                analysis.push_str(&format!("  - Available techniques: {}\n", techniques.len()));
                let best: Vec<&str> = techniques
                    .iter()
                    .take(3)
                    .filter_map(|t| t.as_str())
                    .collect();
                analysis.push_str(&format!("    Best options: {}\n", best.join(", ")));
            }

            if let Some(description) = hit.data.get("description").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("  - Summary: {}...\n", truncate_chars(description, 100)));
            }

            analysis.push('\n');
        }

        analysis.push_str("COMPARATIVE INSIGHTS:\n");
        if data.len() > 1 {
            analysis.push_str(&format!("  - Analyzed {} different approaches\n", data.len()));
            analysis.push_str("  - Each has distinct advantages for specific use cases\n");
            analysis.push_str("  - Consider your specific requirements when choosing\n");
        } else {
            analysis.push_str("  - Single approach analyzed\n");
            analysis.push_str("  - Consider comparing with alternatives\n");
        }

        AnalysisOutcome {
            analysis,
            confidence: 0.85,
        }
    }

    fn analyze_tradeoffs(data: &[TopicHit]) -> AnalysisOutcome {
        let mut analysis = String::from("TRADEOFF ANALYSIS:\n\n");

        for hit in data {
            analysis.push_str(&format!("{}:\n", hit.topic.to_uppercase()));

            if let Some(tradeoffs) = hit.data.get("tradeoffs").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("  Tradeoffs: {}\n\n", tradeoffs));
            }

            if let Some(efficiency) = hit.data.get("efficiency").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("  Efficiency: {}\n\n", efficiency));
            }

            if let Some(components) = hit.data.get("key_components").and_then(|v| v.as_array()) {
                analysis.push_str("  Key Components:\n");
                for component in components.iter().filter_map(|c| c.as_str()) {
                    analysis.push_str(&format!("    - {}\n", component));
                }
                analysis.push('\n');
            }

            if let Some(examples) = hit.data.get("examples").and_then(|v| v.as_array()) {
                let names: Vec<&str> = examples.iter().filter_map(|e| e.as_str()).collect();
                analysis.push_str(&format!("  Real-world Examples: {}\n\n", names.join(", ")));
            }
        }

        analysis.push_str("EFFICIENCY CONSIDERATIONS:\n");
        analysis.push_str("  - Computational cost vs performance gains\n");
        analysis.push_str("  - Memory requirements vs accuracy\n");
        analysis.push_str("  - Training time vs inference speed\n");
        analysis.push_str("  - Complexity vs interpretability\n");

        AnalysisOutcome {
            analysis,
            confidence: 0.80,
        }
    }

    fn identify_patterns(data: &[TopicHit]) -> AnalysisOutcome {
        let mut analysis = String::from("PATTERN IDENTIFICATION:\n\n");

        let mut all_challenges: Vec<String> = Vec::new();
        let mut all_methodologies: Vec<String> = Vec::new();
        let mut all_applications: Vec<String> = Vec::new();

        for hit in data {
            analysis.push_str(&format!("{}:\n", hit.topic.to_uppercase()));

            if let Some(challenges) = hit.data.get("challenges").and_then(|v| v.as_array()) {
                analysis.push_str("  Challenges:\n");
                for challenge in challenges.iter().filter_map(|c| c.as_str()) {
                    analysis.push_str(&format!("    - {}\n", challenge));
                    all_challenges.push(challenge.to_string());
                }
                analysis.push('\n');
            }

            if let Some(methodologies) = hit.data.get("methodologies").and_then(|v| v.as_array()) {
                analysis.push_str("  Methodologies:\n");
                for methodology in methodologies.iter().filter_map(|m| m.as_str()) {
                    analysis.push_str(&format!("    - {}\n", methodology));
                    all_methodologies.push(methodology.to_string());
                }
                analysis.push('\n');
            }

            if let Some(papers) = hit.data.get("papers").and_then(|v| v.as_array()) {
                analysis.push_str(&format!("  Research Papers: {} found\n", papers.len()));
                for paper in papers.iter().take(3).filter_map(|p| p.as_str()) {
                    analysis.push_str(&format!("    - {}\n", paper));
                }
                analysis.push('\n');
            }

            if let Some(applications) = hit.data.get("applications").and_then(|v| v.as_array()) {
                all_applications
                    .extend(applications.iter().filter_map(|a| a.as_str().map(String::from)));
            }
        }

        if !all_challenges.is_empty() {
            analysis.push_str("COMMON CHALLENGES:\n");
            for challenge in dedupe(&all_challenges).into_iter().take(5) {
                analysis.push_str(&format!("  - {}\n", challenge));
            }
            analysis.push('\n');
        }

        if !all_methodologies.is_empty() {
            analysis.push_str("COMMON METHODOLOGIES:\n");
            for methodology in dedupe(&all_methodologies).into_iter().take(5) {
                analysis.push_str(&format!("  - {}\n", methodology));
            }
            analysis.push('\n');
        }

        if !all_applications.is_empty() {
            analysis.push_str("APPLICATIONS:\n");
            for application in dedupe(&all_applications).into_iter().take(5) {
                analysis.push_str(&format!("  - {}\n", application));
            }
        }

        AnalysisOutcome {
            analysis,
            confidence: 0.82,
        }
    }

    fn generate_recommendations(data: &[TopicHit]) -> AnalysisOutcome {
        let mut analysis = String::from("RECOMMENDATIONS:\n\n");

        for (idx, hit) in data.iter().enumerate() {
            analysis.push_str(&format!("{}. {}:\n", idx + 1, hit.topic.to_uppercase()));

            if let Some(effectiveness) = hit.data.get("effectiveness").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("   Recommended for: {}\n", effectiveness));
            }

            if let Some(applications) = hit.data.get("applications").and_then(|v| v.as_array()) {
                let best: Vec<&str> = applications
                    .iter()
                    .take(3)
                    .filter_map(|a| a.as_str())
                    .collect();
                analysis.push_str(&format!("   Best suited for: {}\n", best.join(", ")));
            }

            if let Some(techniques) = hit.data.get("techniques").and_then(|v| v.as_array()) {
                let first = techniques
                    .first()
                    .and_then(|t| t.as_str())
                    .unwrap_or("N/A");
                analysis.push_str(&format!("   Start with: {}\n", first));
            }

            analysis.push('\n');
        }

        analysis.push_str("OVERALL RECOMMENDATION:\n");
        analysis.push_str("  - Evaluate based on your specific use case requirements\n");
        analysis.push_str("  - Consider available resources (compute, data, time)\n");
        analysis.push_str("  - Start with simpler approaches and scale up as needed\n");
        analysis.push_str("  - Monitor performance metrics and iterate\n");

        AnalysisOutcome {
            analysis,
            confidence: 0.78,
        }
    }

    fn general_analysis(data: &[TopicHit]) -> AnalysisOutcome {
        let mut analysis = String::from("GENERAL ANALYSIS:\n\n");

        analysis.push_str(&format!("Analyzed {} topic(s):\n\n", data.len()));

        for hit in data {
            analysis.push_str(&format!("- {}\n", hit.topic.to_uppercase()));

            let mut info_types = Vec::new();
            for (field, label) in [
                ("types", "types"),
                ("techniques", "techniques"),
                ("challenges", "challenges"),
                ("applications", "applications"),
            ] {
                if let Some(items) = hit.data.get(field).and_then(|v| v.as_array()) {
                    info_types.push(format!("{} {}", items.len(), label));
                }
            }

            if !info_types.is_empty() {
                analysis.push_str(&format!("  Found: {}\n", info_types.join(", ")));
            }

            if let Some(description) = hit.data.get("description").and_then(|v| v.as_str()) {
                analysis.push_str(&format!("  Summary: {}...\n", truncate_chars(description, 100)));
            }

            analysis.push('\n');
        }

        analysis.push_str("For more specific analysis, try asking about:\n");
        analysis.push_str("  - Comparisons and effectiveness\n");
        analysis.push_str("  - Efficiency and tradeoffs\n");
        analysis.push_str("  - Challenges and methodologies\n");
        analysis.push_str("  - Recommendations\n");

        AnalysisOutcome {
            analysis,
            confidence: 0.75,
        }
    }
}

impl Default for AnalysisAgent {
    fn default() -> Self {
        Self::new()
    }
}

/// First occurrence of each string, preserving order.
fn dedupe(items: &[String]) -> Vec<&str> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item.as_str()) {
            seen.push(item.as_str());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(topic: &str, data: serde_json::Value) -> TopicHit {
        TopicHit {
            topic: topic.to_string(),
            data,
            relevance: 1.0,
        }
    }

    #[test]
    fn test_empty_data_yields_zero_confidence() {
        let agent = AnalysisAgent::new();

        let outcome = agent.analyze(&[], "compare everything");

        assert_eq!(outcome.analysis, "No data provided for analysis");
        assert_eq!(outcome.confidence, 0.0);
    }

    #[test]
    fn test_compare_routing() {
        let agent = AnalysisAgent::new();
        let data = vec![hit(
            "machine learning optimization",
            json!({
                "techniques": ["Adam", "SGD", "RMSprop", "Momentum"],
                "effectiveness": "Adam is generally most effective",
                "description": "Optimization techniques adjust model parameters to minimize loss functions during training."
            }),
        )];

        let outcome = agent.analyze(&data, "compare optimization techniques");

        assert!(outcome.analysis.starts_with("COMPARISON ANALYSIS:"));
        assert!(outcome.analysis.contains("MACHINE LEARNING OPTIMIZATION:"));
        assert!(outcome.analysis.contains("Available techniques: 4"));
        assert!(outcome.analysis.contains("Best options: Adam, SGD, RMSprop"));
        assert!(outcome.analysis.contains("Single approach analyzed"));
        assert_eq!(outcome.confidence, 0.85);
    }

    #[test]
    fn test_tradeoff_routing() {
        let agent = AnalysisAgent::new();
        let data = vec![hit(
            "transformer architectures",
            json!({
                "tradeoffs": "Memory intensive but parallel",
                "efficiency": "High cost, great throughput",
                "key_components": ["Self-attention", "Positional encoding"],
                "examples": ["BERT", "GPT"]
            }),
        )];

        let outcome = agent.analyze(&data, "analyze their computational efficiency");

        assert!(outcome.analysis.starts_with("TRADEOFF ANALYSIS:"));
        assert!(outcome.analysis.contains("Tradeoffs: Memory intensive but parallel"));
        assert!(outcome.analysis.contains("Real-world Examples: BERT, GPT"));
        assert!(outcome.analysis.contains("EFFICIENCY CONSIDERATIONS:"));
        assert_eq!(outcome.confidence, 0.80);
    }

    #[test]
    fn test_pattern_routing_deduplicates() {
        let agent = AnalysisAgent::new();
        let data = vec![
            hit(
                "reinforcement learning",
                json!({
                    "challenges": ["Sample efficiency", "Reward design"],
                    "papers": ["Paper A", "Paper B", "Paper C", "Paper D"],
                    "applications": ["Robotics"]
                }),
            ),
            hit(
                "deep learning",
                json!({
                    "challenges": ["Sample efficiency"],
                    "applications": ["Robotics", "Vision"]
                }),
            ),
        ];

        let outcome = agent.analyze(&data, "identify common challenges");

        assert!(outcome.analysis.starts_with("PATTERN IDENTIFICATION:"));
        assert!(outcome.analysis.contains("Research Papers: 4 found"));
        assert!(outcome.analysis.contains("COMMON CHALLENGES:"));
        // Shared challenge listed once in the common section
        let common = outcome.analysis.split("COMMON CHALLENGES:").nth(1).unwrap();
        assert_eq!(common.matches("Sample efficiency").count(), 1);
        assert_eq!(outcome.confidence, 0.82);
    }

    #[test]
    fn test_recommendation_routing() {
        let agent = AnalysisAgent::new();
        let data = vec![hit(
            "machine learning optimization",
            json!({
                "effectiveness": "Adam for deep learning",
                "techniques": ["Gradient Descent", "Adam"]
            }),
        )];

        let outcome = agent.analyze(&data, "recommend which is better");

        assert!(outcome.analysis.starts_with("RECOMMENDATIONS:"));
        assert!(outcome.analysis.contains("1. MACHINE LEARNING OPTIMIZATION:"));
        assert!(outcome.analysis.contains("Start with: Gradient Descent"));
        assert!(outcome.analysis.contains("OVERALL RECOMMENDATION:"));
        assert_eq!(outcome.confidence, 0.78);
    }

    #[test]
    fn test_general_routing() {
        let agent = AnalysisAgent::new();
        let data = vec![hit(
            "computer vision",
            json!({
                "applications": ["Medical imaging", "Driving"]
            }),
        )];

        let outcome = agent.analyze(&data, "tell me about this");

        assert!(outcome.analysis.starts_with("GENERAL ANALYSIS:"));
        assert!(outcome.analysis.contains("Analyzed 1 topic(s):"));
        assert!(outcome.analysis.contains("Found: 2 applications"));
        assert_eq!(outcome.confidence, 0.75);
    }

    #[test]
    fn test_estimate_confidence_caps() {
        let agent = AnalysisAgent::new();
        let data: Vec<TopicHit> = (0..10)
            .map(|i| hit(&format!("topic {}", i), json!({})))
            .collect();

        let long_report = "x".repeat(600);
        let confidence = agent.estimate_confidence(&data, &long_report);

        // 0.5 base + 0.3 capped topic bonus + 0.2 length bonus
        assert_eq!(confidence, 1.0);

        let short = agent.estimate_confidence(&data[..1], "short");
        assert!((short - 0.6).abs() < 1e-9);
    }
}

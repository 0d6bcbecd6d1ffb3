//! Scripted demo scenarios, saved as plain-text transcripts.
//!
//! All five run against one coordinator instance, so the memory scenario can
//! recall what the earlier ones stored.

use anyhow::{Context, Result};
use chrono::Utc;
use quorum_agents::CoordinatorAgent;
use std::fs;
use std::path::Path;

/// The demo scenarios: transcript name and query.
pub const SCENARIOS: [(&str, &str); 5] = [
    (
        "simple_query",
        "What are the main types of neural networks?",
    ),
    (
        "complex_query",
        "Research transformer architectures, analyze their computational efficiency, and summarize key trade-offs.",
    ),
    (
        "memory_test",
        "What did we discuss about neural networks earlier?",
    ),
    (
        "multi_step",
        "Find recent papers on reinforcement learning, analyze their methodologies, and identify common challenges.",
    ),
    (
        "collaborative",
        "Compare machine learning optimization techniques and recommend which is better.",
    ),
];

/// Run every scenario and write its transcript under `output_dir`.
pub async fn run_all(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let coordinator = CoordinatorAgent::new();

    for (name, query) in SCENARIOS {
        println!("\n{}", "=".repeat(70));
        println!("SCENARIO: {}", name.replace('_', " ").to_uppercase());
        println!("{}\n", "=".repeat(70));
        println!("Query: {}\n", query);

        let response = coordinator.process_query(query).await?;
        println!("{}", response);

        let path = output_dir.join(format!("{}.txt", name));
        fs::write(&path, transcript(name, query, &response))
            .with_context(|| format!("writing transcript {}", path.display()))?;

        println!("Saved: {}", path.display());
    }

    println!("\nAll scenarios completed. Transcripts in: {}", output_dir.display());

    Ok(())
}

fn transcript(name: &str, query: &str, response: &str) -> String {
    let banner = "=".repeat(70);
    format!(
        "{banner}\nSCENARIO: {title}\n{banner}\n\n\
         Timestamp: {timestamp}\n\n\
         QUERY:\n{query}\n\n\
         {banner}\nRESPONSE:\n{banner}\n\n\
         {response}\n\n\
         {banner}\nEND OF SCENARIO\n{banner}\n",
        banner = banner,
        title = name.replace('_', " ").to_uppercase(),
        timestamp = Utc::now().to_rfc3339(),
        query = query,
        response = response,
    )
}

//! Quorum CLI - interactive chat loop and scripted scenario runner.

use anyhow::Result;
use clap::{Parser, Subcommand};
use quorum_agents::journal::SessionJournal;
use quorum_agents::CoordinatorAgent;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scenarios;

#[derive(Parser)]
#[command(name = "quorum", about = "Multi-agent chat assistant", version)]
struct Cli {
    /// Where the session journal is written
    #[arg(long, env = "QUORUM_JOURNAL", default_value = "logs/session.jsonl")]
    journal: PathBuf,

    /// Enable debug-level diagnostics
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the five scripted demo scenarios and save their transcripts
    Scenarios {
        /// Directory the transcripts are written to
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Some(Command::Scenarios { output_dir }) => scenarios::run_all(&output_dir).await,
        None => chat(&cli.journal).await,
    }
}

async fn chat(journal_path: &Path) -> Result<()> {
    let journal = SessionJournal::new(journal_path)?;
    let coordinator = CoordinatorAgent::new();

    info!(session = %journal.session(), journal = %journal.path().display(), "session started");

    print_welcome();
    print_menu();

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nEnd of input. Goodbye!");
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("\nEnding session. Goodbye!");
                break;
            }
            "memory" => {
                show_memory(&coordinator).await;
                continue;
            }
            "clear" => {
                coordinator.memory().clear_all().await;
                println!("\nConversation history cleared.");
                continue;
            }
            "help" => {
                print_welcome();
                continue;
            }
            "menu" => {
                print_menu();
                continue;
            }
            _ => {}
        }

        journal.record_query(input)?;

        match coordinator.process_query(input).await {
            Ok(response) => {
                println!("\n{}", "=".repeat(70));
                println!("RESPONSE");
                println!("{}\n", "=".repeat(70));
                println!("{}", response);
                println!("{}\n", "=".repeat(70));

                journal.record_response(&response)?;
            }
            Err(error) => {
                println!("\nError processing query: {}", error);
                journal.record_error(&error.to_string())?;
            }
        }
    }

    Ok(())
}

fn print_welcome() {
    println!("\n{}", "=".repeat(70));
    println!("MULTI-AGENT CHAT SYSTEM");
    println!("{}", "=".repeat(70));
    println!("\nAvailable Agents:");
    println!("  - Coordinator - Orchestrates all agents");
    println!("  - Research Agent - Information retrieval");
    println!("  - Analysis Agent - Data analysis and reasoning");
    println!("  - Memory Agent - Knowledge persistence");
    println!("\nCommands:");
    println!("  - Type your question and press Enter");
    println!("  - Type 'exit' or 'quit' to end session");
    println!("  - Type 'memory' to view stored knowledge");
    println!("  - Type 'clear' to clear conversation history");
    println!("{}\n", "=".repeat(70));
}

fn print_menu() {
    println!("\nSample Queries:");
    for (idx, (_, query)) in scenarios::SCENARIOS.iter().enumerate() {
        println!("{}. {}", idx + 1, query);
    }
    println!("\nOr type your own question...\n");
}

async fn show_memory(coordinator: &CoordinatorAgent) {
    let stats = coordinator.memory().statistics().await;

    println!("\n{}", "=".repeat(70));
    println!("MEMORY CONTENTS");
    println!("{}", "=".repeat(70));

    println!("\nConversations stored: {}", stats.conversations);
    println!("Knowledge base entries: {}", stats.knowledge_items);

    if stats.knowledge_items > 0 {
        println!("\nRecent knowledge:");
        let recent = coordinator.memory().conversation_history(5).await;
        for (idx, record) in recent.iter().enumerate() {
            println!("\n  {}. {}", idx + 1, record.key);
            println!("     Confidence: {:.2}", record.metadata.confidence);
            println!("     Timestamp: {}", record.metadata.timestamp.to_rfc3339());
        }
    }

    println!("\nAgent states tracked: {}", stats.agent_states);
    println!("{}\n", "=".repeat(70));
}

mod analyze;
mod chat;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use socialens_analysis::OpenAiCompleter;
use socialens_core::{AppConfig, Completer, DisabledCompleter};
use tracing_subscriber::EnvFilter;

use crate::chat::ChatArgs;

#[derive(Debug, Parser)]
#[command(name = "socialens-cli")]
#[command(about = "Social profile analysis and conversation insights")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and summarize social media URLs
    Analyze {
        /// URLs to analyze (only the first few are fetched)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive conversation
    Chat(ChatArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = socialens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let completer = build_completer(&config)?;

    match cli.command {
        Commands::Analyze { urls, json } => {
            analyze::run_analyze(&config, completer, &urls, json).await?;
        }
        Commands::Chat(args) => chat::run_chat(&config, completer, args).await?,
    }

    Ok(())
}

/// The configured generative service, or one that always fails when no API
/// key is set so every component falls back to its template or default.
fn build_completer(config: &AppConfig) -> anyhow::Result<Arc<dyn Completer>> {
    if let Some(completer) = OpenAiCompleter::from_config(config)? {
        tracing::debug!(model = %config.llm_model, "using OpenAI-compatible completer");
        Ok(Arc::new(completer))
    } else {
        tracing::warn!("OPENAI_API_KEY not set; generated text falls back to templates");
        Ok(Arc::new(DisabledCompleter))
    }
}

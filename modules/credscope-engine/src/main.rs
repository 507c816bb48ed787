use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use credscope_common::{Config, RunStatus};
use credscope_engine::pipeline::Pipeline;
use credscope_engine::reference::ReferenceData;
use credscope_engine::report;
use credscope_engine::search::{DisabledSearch, SearchProvider, TavilySearch};
use credscope_engine::store::{MemoryRunStore, RunStore};
use reason_client::claude::ClaudeEngine;

/// Analyze a piece of news text and print its credibility report.
#[derive(Parser)]
#[command(name = "credscope", about = "News credibility analysis pipeline")]
struct Args {
    /// Path to a file containing the news text to analyze
    #[arg(short, long, conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Literal news text to analyze
    text: Option<String>,

    /// Emit the full run record as JSON instead of the rendered report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("credscope=info".parse()?))
        .init();

    let args = Args::parse();
    let text = match (&args.input, &args.text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => anyhow::bail!("Provide news text as an argument or via --input"),
    };

    // Load config
    let config = Config::from_env();
    info!(model = config.engine_model.as_str(), "credscope starting");

    let engine = Arc::new(ClaudeEngine::new(
        &config.anthropic_api_key,
        &config.engine_model,
    ));
    let search: Arc<dyn SearchProvider> = if config.search_enabled() {
        Arc::new(TavilySearch::new(
            config.tavily_api_key.clone(),
            reqwest::Client::new(),
        ))
    } else {
        Arc::new(DisabledSearch::new())
    };

    let pipeline = Pipeline::new(engine, search, Arc::new(ReferenceData::default()));
    let run = pipeline.run(&text).await;

    // Persist the snapshot; a store failure never discards the result.
    let store = MemoryRunStore::new();
    if let Err(e) = store.upsert(&run).await {
        warn!(run_id = run.id.as_str(), error = %e, "failed to persist run");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("{}", report::render(&run));
    }

    if run.status == RunStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}

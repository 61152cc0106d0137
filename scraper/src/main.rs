//! Job board scraper CLI
//!
//! Runs one search across the configured Greenhouse and Lever boards
//! and saves the matching jobs to data/jobs.json

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use job_scraper::{Aggregator, HttpFetcher, ScraperConfig, SourceRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "job-scraper")]
#[command(about = "Search Greenhouse and Lever job boards")]
struct Cli {
    /// Text to match against job titles (case-insensitive)
    query: String,

    /// Only keep jobs whose location mentions "remote"
    #[arg(short, long)]
    remote_only: bool,

    /// Only keep jobs posted on or after this date (YYYY-MM-DD)
    #[arg(short, long)]
    after_date: Option<String>,

    /// JSON registry of boards to query (overrides JOBS_SOURCES_FILE)
    #[arg(short, long)]
    sources: Option<PathBuf>,

    /// Where to write the results
    #[arg(short, long, default_value = "data/jobs.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();
    let config = ScraperConfig::from_env().context("Failed to load configuration")?;

    let registry = match cli.sources.as_ref().or(config.sources_file.as_ref()) {
        Some(path) => SourceRegistry::from_file(path)
            .with_context(|| format!("Failed to load sources from {}", path.display()))?,
        None => SourceRegistry::builtin(),
    };
    tracing::info!(sources = registry.len(), "Source registry loaded");

    let fetcher = HttpFetcher::from_config(&config).context("Failed to create HTTP client")?;
    let engine = Aggregator::from_config(&config, Arc::new(registry), Arc::new(fetcher));

    println!("🔍 Searching for \"{}\"...\n", cli.query);
    let jobs = engine
        .search(&cli.query, cli.remote_only, cli.after_date.as_deref())
        .await?;

    for job in &jobs {
        println!("📋 Found: {} at {} ({})", job.title, job.company, job.location);
    }
    println!("\n📊 Total unique jobs found: {}", jobs.len());

    if let Some(dir) = cli.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let json_output = serde_json::to_string_pretty(&jobs).context("Failed to serialize jobs")?;
    fs::write(&cli.output, &json_output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    println!("💾 Saved {} jobs to {:?}", jobs.len(), cli.output);
    Ok(())
}

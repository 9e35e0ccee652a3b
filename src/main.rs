//! Plan Aggregator - Main Entry Point
//!
//! Reads a business idea as JSON, builds the composite plan and writes it out.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use plan_aggregator::config::load_layered;
use plan_aggregator::{
    AppConfig, MarketCache, MarketDataPipeline, MarketFlights, OpenAiAnalysisClient, PlanError,
    PlanOrchestrator, ProviderClient, ResilientClient,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the configured level
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format (text or json)
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Path to the business idea JSON document
    #[arg(short, long)]
    idea: PathBuf,

    /// Write the plan here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit compact rather than pretty-printed JSON
    #[arg(long)]
    compact: bool,
}

fn init_logging(log_level: &str, format: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(
            builder.with_file(true).with_line_number(true).finish(),
        )?;
    }
    Ok(())
}

fn build_orchestrator(config: &AppConfig) -> Result<PlanOrchestrator> {
    let http = ResilientClient::with_policy(config.fetch.timeout(), config.fetch.retry_policy())?;

    let companies = ProviderClient::crunchbase(&config.crunchbase, http.clone())?;
    let statistics = ProviderClient::statista(&config.statista, http.clone())?;
    let pipeline = MarketDataPipeline::new(
        Arc::new(MarketCache::new()),
        Arc::new(MarketFlights::new()),
        Arc::new(companies),
        Arc::new(statistics),
    )
    .with_ttl(config.cache.ttl());

    let analysis = OpenAiAnalysisClient::new(&config.openai, http)?;

    Ok(PlanOrchestrator::new(Arc::new(analysis), Arc::new(pipeline)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_layered(Some(&args.config))?;
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    init_logging(&log_level, &args.log_format)?;

    info!("Starting plan aggregator");
    info!("Configuration file: {}", args.config);

    let raw = std::fs::read_to_string(&args.idea)
        .with_context(|| format!("reading idea from {}", args.idea.display()))?;
    let idea: serde_json::Value =
        serde_json::from_str(&raw).context("idea document is not valid JSON")?;

    let orchestrator = build_orchestrator(&config)?;

    let draft = match orchestrator.build_plan(&idea).await {
        Ok(draft) => draft,
        Err(PlanError::TasksFailed(failures)) => {
            for failure in &failures {
                error!(task = %failure.task, "{}", failure.error);
            }
            anyhow::bail!("{} plan task(s) failed", failures.len());
        }
        Err(e) => {
            for violation in e.violations() {
                error!(field = %violation.field, "{}", violation.message);
            }
            return Err(e.into());
        }
    };

    let rendered = if args.compact {
        serde_json::to_string(&draft)?
    } else {
        serde_json::to_string_pretty(&draft)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing plan to {}", path.display()))?;
            info!("Plan written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

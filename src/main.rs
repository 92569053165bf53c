use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use jobboard_ingest::config::{ENV_RAW_SNAPSHOT_DIR, ENV_STORAGE_ROOT};
use jobboard_ingest::{
    ChromeSessionFactory, IngestPipeline, IngestionWriter, LocalObjectStore, Platform, PipelineConfig,
    adapter_for,
};

/// Scrape one job board and replace today's Parquet partition.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// kalibrr, glints or jobstreet
    #[arg(long)]
    platform: Platform,

    /// Search keyword, already URL-shaped for the board. Repeatable.
    #[arg(long = "keyword")]
    keywords: Vec<String>,

    /// Show the browser window.
    #[arg(long)]
    headed: bool,

    #[arg(long)]
    storage_root: Option<PathBuf>,

    /// Also dump pre-dedup records as CSV into this directory.
    #[arg(long)]
    raw_snapshot_dir: Option<PathBuf>,
}

const DEFAULT_LOG_FILTER: &str = "info,headless_chrome=warn";

/// Loads `.env` (or `path`) and builds the log filter from the result, so a
/// `RUST_LOG` set in the file takes effect.
fn load_env_filter(path: Option<&Path>) -> EnvFilter {
    match path {
        Some(path) => dotenvy::from_path(path).ok(),
        None => dotenvy::dotenv().ok().map(|_| ()),
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(load_env_filter(None))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_lookup(cli.platform, |name| {
        let flag = match name {
            ENV_STORAGE_ROOT => cli.storage_root.as_ref(),
            ENV_RAW_SNAPSHOT_DIR => cli.raw_snapshot_dir.as_ref(),
            _ => None,
        };
        flag.map(|p| p.display().to_string())
            .or_else(|| std::env::var(name).ok())
    })
    .context("loading configuration")?;

    if !cli.keywords.is_empty() {
        config = config.with_keywords(cli.keywords);
    }
    if cli.headed {
        config.headless = false;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let report = runtime.block_on(async {
        let board = adapter_for(config.platform);
        let factory = ChromeSessionFactory::default();
        let writer = IngestionWriter::new(LocalObjectStore::new(&config.storage_root));
        IngestPipeline::new(config).run(board.as_ref(), &factory, &writer).await
    })?;

    tracing::info!(
        platform = %report.platform,
        keywords = report.keywords,
        collected = report.collected,
        duplicates_dropped = report.duplicates_dropped,
        written = report.written,
        "ingestion complete"
    );
    Ok(())
}

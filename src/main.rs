//! hnassets - Hacker News word frequency and iris data assets
//!
//! A CLI tool that materializes a small graph of data assets: the
//! current Hacker News top stories, the most frequent words in their
//! titles (with a bar chart) and a filtered iris dataset.
//!
//! Exit codes:
//!   0 - Every selected asset materialized
//!   1 - Any error (arguments, config, network, storage)

mod analysis;
mod assets;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod source;
mod storage;

use anyhow::{Context, Result};
use assets::{AssetRunner, AssetSettings};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::{MetadataValue, RunReport};
use source::{http, HackerNewsClient, RemoteCsv};
use std::path::PathBuf;
use std::time::Instant;
use storage::ArtifactStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration; the merged settings decide the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&config);

    info!("hnassets v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    match run(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .hnassets.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the data directory, limits, stopwords, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(config: &Config) {
    let level = config.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Materialize the selected assets and print the run report.
async fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();
    let started_at = Utc::now();

    config.validate()?;

    let store = ArtifactStore::new(&config.general.data_dir);
    let client = http::build_client(config.hacker_news.timeout_seconds)
        .context("Failed to build HTTP client")?;
    let stories = HackerNewsClient::new(client.clone(), &config.hacker_news.base_url);
    let datasets = RemoteCsv::new(client, config.iris.url.clone());

    let runner = AssetRunner::new(store, AssetSettings::from(&config), &stories, &datasets);
    let selection = args.asset_keys();
    let quiet = config.general.quiet;

    if !quiet {
        eprintln!("📦 Materializing {} asset(s)", assets::plan(&selection).len());
        eprintln!("   Data directory: {}", runner.store().data_dir().display());
    }

    let materializations = runner
        .run(&selection, |m| {
            if quiet {
                return;
            }
            match m.metadata("num_records") {
                Some(MetadataValue::Int(n)) => eprintln!("   ✅ {} ({} records)", m.asset, n),
                _ => eprintln!("   ✅ {}", m.asset),
            }
        })
        .await
        .context("Materialization failed")?;

    let report = RunReport {
        started_at,
        duration_seconds: start_time.elapsed().as_secs_f64(),
        data_dir: config.general.data_dir.clone(),
        materializations,
    };

    let markdown = report::generate_markdown_report(&report);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => markdown.clone(),
    };
    println!("{}", output);

    if let Some(ref path) = args.output {
        std::fs::write(path, &markdown)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report saved to {}", path.display());
    }

    if !config.general.quiet {
        eprintln!("\n✅ Done in {:.1}s", report.duration_seconds);
    }

    Ok(())
}

/// Where the configuration came from, reported once logging is up.
enum ConfigOrigin {
    File(PathBuf),
    Defaults,
    Unreadable(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::File(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Unreadable(e))),
    }
}

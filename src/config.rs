//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hnassets.toml` files.

use crate::source::hacker_news::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".hnassets.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Hacker News API settings.
    #[serde(default)]
    pub hacker_news: HackerNewsConfig,

    /// Word frequency settings.
    #[serde(default)]
    pub words: WordsConfig,

    /// Bar chart settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Iris dataset settings.
    #[serde(default)]
    pub iris: IrisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding every artifact.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Hide progress bars and informational logs.
    #[serde(default)]
    pub quiet: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            verbose: false,
            quiet: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Hacker News API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerNewsConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of top story ids kept (1..=100).
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Item lookups in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Log a progress line every this many items.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            top_limit: default_top_limit(),
            timeout_seconds: default_timeout(),
            concurrency: default_concurrency(),
            progress_every: default_progress_every(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_top_limit() -> usize {
    100
}

fn default_timeout() -> u64 {
    30
}

fn default_concurrency() -> usize {
    1
}

fn default_progress_every() -> usize {
    20
}

/// Word frequency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordsConfig {
    /// Number of tokens kept.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Stopwords added to the built-in list.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            extra_stopwords: Vec::new(),
        }
    }
}

fn default_top_k() -> usize {
    crate::analysis::DEFAULT_TOP_K
}

/// Bar chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Fixed chart title; by default it is built from `words.top_k`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: None,
        }
    }
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    600
}

/// Iris dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrisConfig {
    /// Location of the header-less iris CSV.
    #[serde(default = "default_iris_url")]
    pub url: String,

    /// Species kept by `iris_setosa`.
    #[serde(default = "default_species")]
    pub species: String,
}

impl Default for IrisConfig {
    fn default() -> Self {
        Self {
            url: default_iris_url(),
            species: default_species(),
        }
    }
}

fn default_iris_url() -> String {
    crate::assets::iris::DEFAULT_IRIS_URL.to_string()
}

fn default_species() -> String {
    "Iris-setosa".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or through their
    /// environment variables) override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.general.data_dir = dir.clone();
        }
        if let Some(ref url) = args.base_url {
            self.hacker_news.base_url = url.clone();
        }
        if let Some(limit) = args.limit {
            self.hacker_news.top_limit = limit;
        }
        if let Some(concurrency) = args.concurrency {
            self.hacker_news.concurrency = concurrency;
        }
        if let Some(top_k) = args.top_k {
            self.words.top_k = top_k;
        }
        if let Some(ref words) = args.stopwords {
            self.words.extra_stopwords.extend(words.iter().cloned());
        }

        // Flags always override, and replace the opposite setting from the file
        if args.verbose {
            self.general.verbose = true;
            self.general.quiet = false;
        }
        if args.quiet {
            self.general.quiet = true;
            self.general.verbose = false;
        }
    }

    /// Log level for the merged settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.general.quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.general.verbose && self.general.quiet {
            anyhow::bail!("general.verbose and general.quiet cannot both be set");
        }
        if !(1..=100).contains(&self.hacker_news.top_limit) {
            anyhow::bail!(
                "hacker_news.top_limit must be between 1 and 100, got {}",
                self.hacker_news.top_limit
            );
        }
        if self.hacker_news.concurrency == 0 {
            anyhow::bail!("hacker_news.concurrency must be at least 1");
        }
        if self.hacker_news.timeout_seconds == 0 {
            anyhow::bail!("hacker_news.timeout_seconds must be at least 1");
        }
        if self.words.top_k == 0 {
            anyhow::bail!("words.top_k must be at least 1");
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            anyhow::bail!("chart dimensions must be non-zero");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::AssetKey;
use clap::Parser;
use std::path::PathBuf;

/// hnassets - materialize Hacker News and iris data assets
///
/// Fetches the current top stories, counts the most frequent words in
/// their titles and renders a bar chart. Also loads the iris dataset and
/// filters one species. Artifacts land in the data directory.
///
/// Examples:
///   hnassets
///   hnassets topstory-ids topstories --limit 30
///   hnassets most-frequent-words --top-k 10 --stopwords show,ask
///   hnassets iris-dataset iris-setosa --format json
///   hnassets --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Assets to materialize (upstream assets are not added implicitly)
    #[arg(value_name = "ASSET", default_value = "all")]
    pub assets: Vec<AssetSelection>,

    /// Directory holding the artifacts
    #[arg(long, value_name = "DIR", env = "HNASSETS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .hnassets.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the Markdown run report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format printed to stdout (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of top story ids to keep (1-100)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Item lookups in flight at once
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Number of words kept in the frequency table
    #[arg(long, value_name = "N")]
    pub top_k: Option<usize>,

    /// Extra stopwords (comma-separated)
    ///
    /// Example: --stopwords show,ask,hn
    #[arg(long, value_name = "WORDS", value_delimiter = ',')]
    pub stopwords: Option<Vec<String>>,

    /// Hacker News API root
    #[arg(long, value_name = "URL", env = "HN_API_URL")]
    pub base_url: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .hnassets.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Asset names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AssetSelection {
    TopstoryIds,
    Topstories,
    MostFrequentWords,
    IrisDataset,
    IrisSetosa,
    /// Every asset
    All,
}

impl AssetSelection {
    fn keys(self) -> &'static [AssetKey] {
        match self {
            AssetSelection::TopstoryIds => &[AssetKey::TopstoryIds],
            AssetSelection::Topstories => &[AssetKey::Topstories],
            AssetSelection::MostFrequentWords => &[AssetKey::MostFrequentWords],
            AssetSelection::IrisDataset => &[AssetKey::IrisDataset],
            AssetSelection::IrisSetosa => &[AssetKey::IrisSetosa],
            AssetSelection::All => &AssetKey::ALL,
        }
    }
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(limit) = self.limit {
            if !(1..=100).contains(&limit) {
                return Err("Limit must be between 1 and 100".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.top_k == Some(0) {
            return Err("Top-k must be at least 1".to_string());
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// The selected asset keys, as given (duplicates and order are
    /// resolved by the runner's plan).
    pub fn asset_keys(&self) -> Vec<AssetKey> {
        self.assets
            .iter()
            .flat_map(|selection| selection.keys().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            assets: vec![AssetSelection::All],
            data_dir: None,
            config: None,
            output: None,
            format: OutputFormat::Markdown,
            limit: None,
            concurrency: None,
            top_k: None,
            stopwords: None,
            base_url: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_positional_assets() {
        let args = Args::try_parse_from([
            "hnassets",
            "topstories",
            "most-frequent-words",
            "--stopwords",
            "show,ask",
            "--limit",
            "30",
        ])
        .unwrap();

        assert_eq!(
            args.asset_keys(),
            vec![AssetKey::Topstories, AssetKey::MostFrequentWords]
        );
        assert_eq!(args.stopwords, Some(vec!["show".to_string(), "ask".to_string()]));
        assert_eq!(args.limit, Some(30));
    }

    #[test]
    fn test_default_selection_is_all() {
        let args = Args::try_parse_from(["hnassets"]).unwrap();
        assert_eq!(args.assets, vec![AssetSelection::All]);
        assert_eq!(args.asset_keys(), AssetKey::ALL.to_vec());
    }

    #[test]
    fn test_unknown_asset_rejected() {
        assert!(Args::try_parse_from(["hnassets", "beststories"]).is_err());
    }

    #[test]
    fn test_validation_limit_range() {
        let mut args = make_args();
        args.limit = Some(100);
        assert!(args.validate().is_ok());

        args.limit = Some(101);
        assert!(args.validate().is_err());

        args.limit = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.top_k = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.base_url = Some("hacker-news.firebaseio.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_merge_into_config() {
        let mut args = make_args();
        args.limit = Some(10);
        args.stopwords = Some(vec!["rust".to_string()]);
        args.quiet = true;

        let mut config = crate::config::Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.hacker_news.top_limit, 10);
        assert_eq!(config.hacker_news.concurrency, 1);
        assert_eq!(config.words.extra_stopwords, vec!["rust"]);
        assert!(config.general.quiet);
    }
}

//! Asset definitions and the runner that materializes them.
//!
//! Each asset reads its upstream artifact from the [`ArtifactStore`],
//! does its work, writes its own artifact and returns a
//! [`Materialization`] describing the result.

pub mod iris;
pub mod most_frequent_words;
pub mod topstories;
pub mod topstory_ids;

use crate::config::Config;
use crate::error::PipelineResult;
use crate::models::{AssetKey, Materialization, StopwordSet};
use crate::report::{default_title, ChartOptions};
use crate::source::{DatasetSource, StorySource};
use crate::storage::ArtifactStore;
use tracing::{debug, error, info};

/// Tunables for every asset, resolved from configuration.
#[derive(Debug, Clone)]
pub struct AssetSettings {
    /// How many top story ids to keep.
    pub top_limit: usize,
    /// Item lookups in flight at once during enrichment.
    pub concurrency: usize,
    /// Log a progress line every this many items.
    pub progress_every: usize,
    /// Show an interactive progress bar during enrichment.
    pub show_progress: bool,
    /// Tokens kept in the word frequency table.
    pub top_k: usize,
    pub stopwords: StopwordSet,
    pub chart: ChartOptions,
    /// Species kept by the iris filter.
    pub iris_species: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            top_limit: 100,
            concurrency: 1,
            progress_every: 20,
            show_progress: false,
            top_k: crate::analysis::DEFAULT_TOP_K,
            stopwords: StopwordSet::default(),
            chart: ChartOptions::default(),
            iris_species: "Iris-setosa".to_string(),
        }
    }
}

impl From<&Config> for AssetSettings {
    fn from(config: &Config) -> Self {
        Self {
            top_limit: config.hacker_news.top_limit,
            concurrency: config.hacker_news.concurrency,
            progress_every: config.hacker_news.progress_every,
            show_progress: !config.general.quiet,
            top_k: config.words.top_k,
            stopwords: StopwordSet::with_extra(&config.words.extra_stopwords),
            chart: ChartOptions {
                width: config.chart.width,
                height: config.chart.height,
                title: config
                    .chart
                    .title
                    .clone()
                    .unwrap_or_else(|| default_title(config.words.top_k)),
            },
            iris_species: config.iris.species.clone(),
        }
    }
}

/// Sort a selection into execution order and drop duplicates.
pub fn plan(selection: &[AssetKey]) -> Vec<AssetKey> {
    let mut ordered = selection.to_vec();
    ordered.sort();
    ordered.dedup();
    ordered
}

/// Materializes assets against a store and a pair of remote sources.
pub struct AssetRunner<'a, S, D> {
    store: ArtifactStore,
    settings: AssetSettings,
    stories: &'a S,
    datasets: &'a D,
}

impl<'a, S: StorySource, D: DatasetSource> AssetRunner<'a, S, D> {
    pub fn new(store: ArtifactStore, settings: AssetSettings, stories: &'a S, datasets: &'a D) -> Self {
        Self {
            store,
            settings,
            stories,
            datasets,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Materialize a single asset.
    pub async fn materialize(&self, key: AssetKey) -> PipelineResult<Materialization> {
        match key {
            AssetKey::TopstoryIds => {
                topstory_ids::materialize(self.stories, &self.store, self.settings.top_limit).await
            }
            AssetKey::Topstories => {
                topstories::materialize(self.stories, &self.store, &self.settings).await
            }
            AssetKey::MostFrequentWords => {
                most_frequent_words::materialize(&self.store, &self.settings)
            }
            AssetKey::IrisDataset => iris::load_iris_dataset(self.datasets, &self.store).await,
            AssetKey::IrisSetosa => {
                iris::materialize_species(&self.store, &self.settings.iris_species)
            }
        }
    }

    /// Materialize a selection in dependency order, stopping at the first failure.
    ///
    /// `on_done` sees each materialization as soon as it completes.
    pub async fn run<F>(&self, selection: &[AssetKey], mut on_done: F) -> PipelineResult<Vec<Materialization>>
    where
        F: FnMut(&Materialization),
    {
        let order = plan(selection);
        let mut results = Vec::with_capacity(order.len());

        for &key in &order {
            for dep in key.deps().iter().filter(|dep| !order.contains(*dep)) {
                debug!("{} reads {} from a previous run", key, dep);
            }
            info!("Materializing {}", key);
            let materialization = match self.materialize(key).await {
                Ok(m) => m,
                Err(e) => {
                    error!("Asset {} failed: {}", key, e);
                    return Err(e);
                }
            };
            info!(
                "Materialized {} ({} artifact(s))",
                key,
                materialization.artifacts.len()
            );
            on_done(&materialization);
            results.push(materialization);
        }

        Ok(results)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeDataset, FakeStories};
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{MetadataValue, WordFrequencyTable};
    use crate::storage;
    use tempfile::TempDir;

    #[test]
    fn test_plan_orders_and_dedups() {
        let order = plan(&[
            AssetKey::IrisSetosa,
            AssetKey::MostFrequentWords,
            AssetKey::TopstoryIds,
            AssetKey::MostFrequentWords,
            AssetKey::Topstories,
        ]);
        assert_eq!(
            order,
            vec![
                AssetKey::TopstoryIds,
                AssetKey::Topstories,
                AssetKey::MostFrequentWords,
                AssetKey::IrisSetosa,
            ]
        );
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.words.extra_stopwords = vec!["hn".to_string()];
        config.hacker_news.top_limit = 30;

        let settings = AssetSettings::from(&config);
        assert_eq!(settings.top_limit, 30);
        assert_eq!(settings.top_k, 25);
        assert!(settings.stopwords.contains("hn"));
        assert!(settings.stopwords.contains("the"));
        assert_eq!(settings.chart.title, "Top 25 Words in Hacker News Titles");
    }

    #[test]
    fn test_chart_title_tracks_top_k() {
        let mut config = Config::default();
        config.words.top_k = 10;
        assert_eq!(
            AssetSettings::from(&config).chart.title,
            "Top 10 Words in Hacker News Titles"
        );

        config.chart.title = Some("Custom".to_string());
        assert_eq!(AssetSettings::from(&config).chart.title, "Custom");
    }

    #[tokio::test]
    async fn test_full_run_writes_every_artifact() {
        let tmp = TempDir::new().unwrap();
        let stories = FakeStories::with_titles(&["The Cat Sat", "the cat ran", "Dog ran fast"]);
        let iris = FakeDataset(include_str!("../../fixtures/iris.csv").to_string());
        let runner = AssetRunner::new(
            ArtifactStore::new(tmp.path().join("data")),
            AssetSettings::default(),
            &stories,
            &iris,
        );

        let results = runner.run(&AssetKey::ALL, |_| {}).await.unwrap();

        assert_eq!(results.len(), 5);
        for name in [
            storage::TOPSTORY_IDS,
            storage::TOPSTORIES,
            storage::MOST_FREQUENT_WORDS,
            storage::IRIS_DATASET,
            storage::IRIS_SETOSA,
        ] {
            assert!(runner.store().path(name).exists(), "{} missing", name);
        }

        let words: WordFrequencyTable = runner.store().read_json(storage::MOST_FREQUENT_WORDS).unwrap();
        assert_eq!(words.tokens().collect::<Vec<_>>(), vec!["cat", "ran", "sat", "dog", "fast"]);

        assert_eq!(results[1].metadata("num_records"), Some(&MetadataValue::Int(3)));
        assert_eq!(results[4].metadata("num_records"), Some(&MetadataValue::Int(3)));
    }

    #[tokio::test]
    async fn test_downstream_without_upstream_fails() {
        let tmp = TempDir::new().unwrap();
        let stories = FakeStories::default();
        let iris = FakeDataset(String::new());
        let runner = AssetRunner::new(
            ArtifactStore::new(tmp.path()),
            AssetSettings::default(),
            &stories,
            &iris,
        );

        let err = runner.run(&[AssetKey::MostFrequentWords], |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingArtifact(_)));
    }
}

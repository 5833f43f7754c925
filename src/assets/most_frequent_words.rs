//! `most_frequent_words`: top title tokens and their bar chart.

use crate::analysis::most_frequent_words;
use crate::assets::AssetSettings;
use crate::error::PipelineResult;
use crate::models::{AssetKey, Materialization, MetadataValue, StopwordSet, StoryTable, WordFrequencyTable};
use crate::report::{encode_png, markdown_image, render_bar_chart, ChartOptions};
use crate::storage::{ArtifactStore, MOST_FREQUENT_WORDS, TOPSTORIES};
use tracing::{info, warn};

/// Output of one aggregation: the counts and the chart as inline Markdown.
#[derive(Debug, Clone)]
pub struct WordReport {
    pub words: WordFrequencyTable,
    pub plot: String,
}

/// Count title tokens and render the chart.
pub fn aggregate(
    table: &StoryTable,
    stopwords: &StopwordSet,
    top_k: usize,
    chart: &ChartOptions,
) -> PipelineResult<WordReport> {
    let words = most_frequent_words(table, stopwords, top_k);
    let png = encode_png(&render_bar_chart(&words, chart)?)?;

    Ok(WordReport {
        words,
        plot: markdown_image(&png),
    })
}

pub fn materialize(store: &ArtifactStore, settings: &AssetSettings) -> PipelineResult<Materialization> {
    let table = StoryTable::read_csv(store.open(TOPSTORIES)?)?;
    if table.is_empty() {
        warn!("{} has no rows; the word table will be empty", TOPSTORIES);
    } else {
        info!("Counting words across {} titles", table.len());
    }

    let report = aggregate(&table, &settings.stopwords, settings.top_k, &settings.chart)?;
    info!(
        "Top words: {}",
        report.words.tokens().take(5).collect::<Vec<_>>().join(", ")
    );
    let path = store.write_json(MOST_FREQUENT_WORDS, &report.words)?;

    Ok(Materialization::new(AssetKey::MostFrequentWords)
        .with_artifact(path)
        .with_metadata("plot", MetadataValue::Markdown(report.plot)))
}

//! `topstories`: item details for every ranked id.
//!
//! Lookups run in identifier order (optionally several in flight) and the
//! rows are buffered until the whole pass succeeds. Only then is the CSV
//! written, so a failed lookup leaves no partial table behind.

use crate::assets::AssetSettings;
use crate::error::PipelineResult;
use crate::models::{AssetKey, IdentifierList, Materialization, MetadataValue, StoryTable};
use crate::report::generator::PREVIEW_ROWS;
use crate::report::story_preview;
use crate::source::StorySource;
use crate::storage::{ArtifactStore, TOPSTORIES, TOPSTORY_IDS};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::pin::pin;
use tracing::{debug, info, warn};

/// Options controlling an enrichment pass.
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    pub concurrency: usize,
    pub progress_every: usize,
    pub show_progress: bool,
}

impl From<&AssetSettings> for EnrichOptions {
    fn from(settings: &AssetSettings) -> Self {
        Self {
            concurrency: settings.concurrency,
            progress_every: settings.progress_every,
            show_progress: settings.show_progress,
        }
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Look up every id, returning rows in id order.
pub async fn enrich<S: StorySource>(
    source: &S,
    ids: &IdentifierList,
    options: EnrichOptions,
) -> PipelineResult<StoryTable> {
    let progress_every = options.progress_every.max(1);
    let pb = progress_bar(ids.len(), options.show_progress);

    // `buffered` yields results in input order regardless of completion order.
    let mut lookups = pin!(stream::iter(ids.iter())
        .map(|id| source.item(id))
        .buffered(options.concurrency.max(1)));

    let mut rows = Vec::with_capacity(ids.len());
    while let Some(item) = lookups.next().await {
        rows.push(item?);
        pb.inc(1);

        if rows.len() % progress_every == 0 {
            info!("Got {} items so far.", rows.len());
        }
    }

    pb.finish_and_clear();
    debug!("Enriched {} of {} ids", rows.len(), ids.len());

    Ok(StoryTable::new(rows))
}

pub async fn materialize<S: StorySource>(
    source: &S,
    store: &ArtifactStore,
    settings: &AssetSettings,
) -> PipelineResult<Materialization> {
    let ids: IdentifierList = store.read_json(TOPSTORY_IDS)?;
    if ids.is_empty() {
        warn!("{} lists no stories; writing an empty table", TOPSTORY_IDS);
    } else {
        info!("Fetching details for {} stories", ids.len());
    }

    let table = enrich(source, &ids, EnrichOptions::from(settings)).await?;
    let path = store.write_with(TOPSTORIES, |w| table.write_csv(w))?;

    Ok(Materialization::new(AssetKey::Topstories)
        .with_artifact(path)
        .with_metadata("num_records", MetadataValue::Int(table.len() as u64))
        .with_metadata(
            "preview",
            MetadataValue::Markdown(story_preview(&table, PREVIEW_ROWS)),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::testing::FakeStories;
    use crate::error::PipelineError;
    use std::io;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn options(concurrency: usize) -> EnrichOptions {
        EnrichOptions {
            concurrency,
            progress_every: 20,
            show_progress: false,
        }
    }

    fn hundred_stories() -> FakeStories {
        let titles: Vec<String> = (1..=100).map(|i| format!("Story number {}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        FakeStories::with_titles(&refs)
    }

    #[tokio::test]
    async fn test_rows_follow_id_order() {
        let stories = hundred_stories();
        let ids = IdentifierList(vec![30, 2, 99, 7]);

        for concurrency in [1, 8] {
            let table = enrich(&stories, &ids, options(concurrency)).await.unwrap();
            let titles: Vec<&str> = table.titles().collect();
            assert_eq!(
                titles,
                vec!["Story number 30", "Story number 2", "Story number 99", "Story number 7"]
            );
        }
    }

    #[tokio::test]
    async fn test_progress_logged_every_twenty_items() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let stories = hundred_stories();
        let ids = IdentifierList((1..=100).collect());
        enrich(&stories, &ids, options(1)).await.unwrap();

        let output = logs.contents();
        let progress: Vec<&str> = output
            .lines()
            .filter_map(|line| line.find("Got ").map(|at| &line[at..]))
            .collect();
        assert_eq!(
            progress,
            vec![
                "Got 20 items so far.",
                "Got 40 items so far.",
                "Got 60 items so far.",
                "Got 80 items so far.",
                "Got 100 items so far.",
            ]
        );
    }

    #[tokio::test]
    async fn test_materialize_writes_csv_and_metadata() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let stories = hundred_stories();
        store.write_json(TOPSTORY_IDS, &IdentifierList((1..=100).collect())).unwrap();

        let m = materialize(&stories, &store, &AssetSettings::default()).await.unwrap();

        assert_eq!(m.metadata("num_records"), Some(&MetadataValue::Int(100)));
        match m.metadata("preview") {
            Some(MetadataValue::Markdown(md)) => {
                assert_eq!(md.lines().count(), 2 + PREVIEW_ROWS);
                assert!(md.contains("Story number 1 "));
            }
            other => panic!("unexpected preview: {:?}", other),
        }

        let table = StoryTable::read_csv(store.open(TOPSTORIES).unwrap()).unwrap();
        assert_eq!(table.len(), 100);
        assert_eq!(table.rows[99].title.as_deref(), Some("Story number 100"));
    }

    #[tokio::test]
    async fn test_failure_on_fifth_item_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let mut stories = hundred_stories();
        stories.fail_on = Some(5);
        store.write_json(TOPSTORY_IDS, &IdentifierList((1..=100).collect())).unwrap();

        let err = materialize(&stories, &store, &AssetSettings::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Status { status: 503, .. }));
        assert_eq!(stories.lookups.load(Ordering::SeqCst), 5);
        assert!(!store.path(TOPSTORIES).exists());
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(TOPSTORY_IDS)]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_artifact_intact() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.write_json(TOPSTORY_IDS, &IdentifierList(vec![1, 2])).unwrap();

        let stories = FakeStories::with_titles(&["first", "second"]);
        materialize(&stories, &store, &AssetSettings::default()).await.unwrap();
        let before = std::fs::read_to_string(store.path(TOPSTORIES)).unwrap();

        let failing = FakeStories {
            fail_on: Some(2),
            ..FakeStories::with_titles(&["changed", "changed"])
        };
        assert!(materialize(&failing, &store, &AssetSettings::default()).await.is_err());

        assert_eq!(std::fs::read_to_string(store.path(TOPSTORIES)).unwrap(), before);
    }

    #[tokio::test]
    async fn test_empty_id_list() {
        let stories = FakeStories::default();
        let table = enrich(&stories, &IdentifierList::default(), options(4)).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_materialize_empty_id_list_writes_header_only() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.write_json(TOPSTORY_IDS, &IdentifierList::default()).unwrap();

        let stories = FakeStories::default();
        let m = materialize(&stories, &store, &AssetSettings::default()).await.unwrap();

        assert_eq!(m.metadata("num_records"), Some(&MetadataValue::Int(0)));
        assert_eq!(stories.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_to_string(store.path(TOPSTORIES)).unwrap(), "title\n");
    }
}

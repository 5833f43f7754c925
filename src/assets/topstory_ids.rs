//! `topstory_ids`: the current top story ranking.

use crate::error::PipelineResult;
use crate::models::{AssetKey, IdentifierList, Materialization, MetadataValue};
use crate::source::StorySource;
use crate::storage::{ArtifactStore, TOPSTORY_IDS};
use tracing::info;

/// Fetch the ranking and keep the first `limit` ids.
pub async fn fetch_top_identifiers<S: StorySource>(
    source: &S,
    limit: usize,
) -> PipelineResult<IdentifierList> {
    let ranking = source.top_story_ids().await?;
    info!("Ranking returned {} ids, keeping {}", ranking.len(), limit.min(ranking.len()));
    Ok(IdentifierList::from_ranking(ranking, limit))
}

pub async fn materialize<S: StorySource>(
    source: &S,
    store: &ArtifactStore,
    limit: usize,
) -> PipelineResult<Materialization> {
    let ids = fetch_top_identifiers(source, limit).await?;
    let path = store.write_json(TOPSTORY_IDS, &ids)?;

    Ok(Materialization::new(AssetKey::TopstoryIds)
        .with_artifact(path)
        .with_metadata("num_records", MetadataValue::Int(ids.len() as u64)))
}

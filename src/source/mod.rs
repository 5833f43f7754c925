//! Remote data sources.
//!
//! Assets talk to the network through these traits so they can be driven
//! by canned data in tests.

pub mod hacker_news;
pub mod http;

pub use hacker_news::HackerNewsClient;
pub use http::RemoteCsv;

use crate::error::PipelineResult;
use crate::models::ItemRecord;

/// Ranking and item lookups against a story API.
#[allow(async_fn_in_trait)]
pub trait StorySource {
    /// Ranked story identifiers, best first, unbounded.
    async fn top_story_ids(&self) -> PipelineResult<Vec<u64>>;

    /// Details for a single item.
    async fn item(&self, id: u64) -> PipelineResult<ItemRecord>;
}

/// A remote tabular dataset delivered as CSV text.
#[allow(async_fn_in_trait)]
pub trait DatasetSource {
    async fn fetch_csv(&self) -> PipelineResult<String>;
}

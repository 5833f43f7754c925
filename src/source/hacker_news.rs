//! Hacker News Firebase API client.
//!
//! Two endpoints are used: `{base}/topstories.json` for the ranking and
//! `{base}/item/{id}.json` for item details.

use crate::error::{PipelineError, PipelineResult};
use crate::models::ItemRecord;
use crate::source::http::get_json;
use crate::source::StorySource;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Client for the Hacker News API.
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn top_stories_url(&self) -> String {
        format!("{}/topstories.json", self.base_url)
    }

    pub fn item_url(&self, id: u64) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }
}

impl StorySource for HackerNewsClient {
    async fn top_story_ids(&self) -> PipelineResult<Vec<u64>> {
        get_json(&self.client, &self.top_stories_url()).await
    }

    async fn item(&self, id: u64) -> PipelineResult<ItemRecord> {
        // Unknown ids come back as a literal `null`.
        let item: Option<ItemRecord> = get_json(&self.client, &self.item_url(id)).await?;
        item.ok_or(PipelineError::MissingItem(id))
    }
}

//! Shared HTTP plumbing.

use crate::error::{PipelineError, PipelineResult};
use crate::source::DatasetSource;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Build the HTTP client used by every remote source.
pub fn build_client(timeout_seconds: u64) -> PipelineResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("hnassets/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;
    Ok(client)
}

/// GET `url`, failing on transport errors and non-success statuses.
pub async fn get(client: &reqwest::Client, url: &str) -> PipelineResult<Response> {
    debug!("GET {}", url);

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(PipelineError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    Ok(response)
}

/// GET `url` and decode the body as JSON.
pub async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> PipelineResult<T> {
    let body = get(client, url).await?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// A CSV file served over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteCsv {
    client: reqwest::Client,
    url: String,
}

impl RemoteCsv {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl DatasetSource for RemoteCsv {
    async fn fetch_csv(&self) -> PipelineResult<String> {
        Ok(get(&self.client, &self.url).await?.text().await?)
    }
}

//! Implements the `RelatedPostsFetcher` trait against the WordPress REST API.
//! The post endpoint returns the post itself with a `related_posts` array
//! attached by the site.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::endpoint::EndpointResolver;
use super::{RelatedPostsFetcher, RelatedPostsResult};
use crate::config::RelatedVideoConfig;
use crate::content::{ContentItem, RelatedCandidate};
use crate::error::RelatedVideoResult;

/// The part of a WordPress post response we care about.
#[derive(Debug, Deserialize)]
struct PostResponse {
    #[serde(default)]
    related_posts: Option<Vec<Value>>,
}

/// Fetches related posts over HTTP from the endpoint picked by an [`EndpointResolver`].
pub struct WordPressFetcher {
    client: Client,
    endpoints: EndpointResolver,
}

impl WordPressFetcher {
    pub fn new(client: Client, endpoints: EndpointResolver) -> Self {
        Self { client, endpoints }
    }

    /// Builds a fetcher with its own client, honouring the configured timeout.
    pub fn from_config(config: &RelatedVideoConfig) -> RelatedVideoResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::new(client, EndpointResolver::from_config(config)))
    }
}

#[async_trait]
impl RelatedPostsFetcher for WordPressFetcher {
    async fn fetch_related_posts(&self, item: &ContentItem) -> RelatedPostsResult {
        let url = self.endpoints.post_url(item)?;
        debug!("Requesting related posts from {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let post: PostResponse = serde_json::from_str(&body)?;

        // Only the first post is decoded; the rest may be in any shape.
        let first = match post.related_posts.and_then(|posts| posts.into_iter().next()) {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };
        let candidate: RelatedCandidate = serde_json::from_value(first)?;

        Ok(vec![candidate])
    }
}

//! Resolution of the single "next video" candidate for a content item.
//!
//! A [`RelatedPostsFetcher`] talks to a metadata source and may fail.
//! [`RecommendationFetcher`] sits in front of it and never does: every failure
//! is logged and turned into `None`, so the related-video feature simply stays
//! off for that cycle.

/// Host to endpoint mapping.
pub mod endpoint;
/// Implementation backed by the WordPress REST API.
pub mod wordpress;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::content::{ContentItem, RelatedCandidate};
use crate::error::RelatedVideoError;

/// A specialized `Result` type for related post fetching operations.
pub type RelatedPostsResult = Result<Vec<RelatedCandidate>, RelatedVideoError>;

/// Defines the common interface for fetching posts related to a content item.
#[async_trait]
pub trait RelatedPostsFetcher: Send + Sync {
    /// Fetches the related posts for `item`, in the order the source ranks them.
    ///
    /// Implementations may stop decoding after the first post since only that
    /// one is ever used.
    async fn fetch_related_posts(&self, item: &ContentItem) -> RelatedPostsResult;
}

/// Fail-soft front for a [`RelatedPostsFetcher`] that keeps the last result.
pub struct RecommendationFetcher {
    source: Arc<dyn RelatedPostsFetcher>,
    last_result: Mutex<Option<RelatedCandidate>>,
}

impl RecommendationFetcher {
    pub fn new(source: Arc<dyn RelatedPostsFetcher>) -> Self {
        Self {
            source,
            last_result: Mutex::new(None),
        }
    }

    /// Resolve the next-video candidate for `item`.
    ///
    /// Returns `None` without touching the network when the item has no post
    /// id. Errors and empty responses are logged and also yield `None`.
    pub async fn resolve_candidate(&self, item: &ContentItem) -> Option<RelatedCandidate> {
        let candidate = match item.post_id() {
            None => {
                warn!("No custom fields or post ID found, skipping related video lookup");
                None
            }
            Some(post_id) => {
                debug!("Fetching related posts for post {}", post_id);
                match self.source.fetch_related_posts(item).await {
                    Ok(posts) => {
                        let first = posts.into_iter().next();
                        match &first {
                            Some(candidate) => info!(
                                "Related video for post {}: {} ({})",
                                post_id, candidate.title, candidate.video_id
                            ),
                            None => warn!("No related video found for post {}", post_id),
                        }
                        first
                    }
                    Err(e) => {
                        error!("Error fetching related posts for post {}: {}", post_id, e);
                        None
                    }
                }
            }
        };

        *self.last_result.lock().await = candidate.clone();
        candidate
    }

    /// The candidate from the most recent resolution, if any.
    pub async fn last_result(&self) -> Option<RelatedCandidate> {
        self.last_result.lock().await.clone()
    }
}

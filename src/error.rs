//! Error taxonomy for the related-video feature.
//!
//! None of these errors are allowed to reach the player: the fetcher and the
//! session log them and degrade to "no related video this cycle".

use thiserror::Error;

/// Errors that can occur while resolving or presenting a related video
#[derive(Error, Debug)]
pub enum RelatedVideoError {
    #[error("Content item has no post identifier")]
    MissingPostId,

    #[error("Invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Transport failure or a non-2xx status from the metadata service.
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Unable to parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Element not found: {0}")]
    MissingElement(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for related-video operations
pub type RelatedVideoResult<T> = Result<T, RelatedVideoError>;

//! Runtime configuration for the related-video session and its fetcher.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{RelatedVideoError, RelatedVideoResult};

pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 6;
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 800;
pub const DEFAULT_HOST: &str = "san.com";

/// Settings for one player instance.
///
/// Every field has a default, so a partial JSON document (or none at all) is
/// enough to build one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelatedVideoConfig {
    /// Length of the "up next" countdown, in ticks.
    pub countdown_seconds: u32,
    /// Time between two countdown ticks.
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Width requested from the image service for the overlay thumbnail.
    pub thumbnail_width: u32,
    /// Host name of the page embedding the player.
    pub page_host: String,
    /// Scheme of the page embedding the player.
    pub page_scheme: String,
    /// Production host used when `page_host` is not recognised.
    pub fallback_host: String,
    /// Hosts that serve their own metadata endpoint, on top of the built-in ones.
    pub extra_hosts: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for RelatedVideoConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            tick_interval: Duration::from_secs(1),
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            page_host: DEFAULT_HOST.to_string(),
            page_scheme: "https".to_string(),
            fallback_host: DEFAULT_HOST.to_string(),
            extra_hosts: Vec::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RelatedVideoConfig {
    /// Parse a JSON document, filling missing fields with defaults.
    pub fn from_json(json: &str) -> RelatedVideoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config from environment variables (a `.env` file is honoured
    /// by the caller through `dotenv`). Unparsable values fall back to defaults.
    pub fn from_env() -> RelatedVideoResult<Self> {
        let defaults = Self::default();

        let config = Self {
            countdown_seconds: env_or("RELATED_VIDEO_COUNTDOWN", defaults.countdown_seconds),
            tick_interval: env_duration_or("RELATED_VIDEO_TICK", defaults.tick_interval),
            thumbnail_width: env_or("RELATED_VIDEO_THUMBNAIL_WIDTH", defaults.thumbnail_width),
            page_host: env::var("PAGE_HOST").unwrap_or(defaults.page_host),
            page_scheme: env::var("PAGE_SCHEME").unwrap_or(defaults.page_scheme),
            fallback_host: defaults.fallback_host,
            extra_hosts: defaults.extra_hosts,
            request_timeout: env_duration_or(
                "RELATED_VIDEO_REQUEST_TIMEOUT",
                defaults.request_timeout,
            ),
        };

        config.validate()?;
        debug!("Loaded related video config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> RelatedVideoResult<()> {
        if self.countdown_seconds == 0 {
            return Err(RelatedVideoError::Config(
                "countdown_seconds must be at least 1".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(RelatedVideoError::Config(
                "tick_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn env_duration_or(key: &str, default: Duration) -> Duration {
    match env::var(key) {
        Ok(raw) => humantime_serde::re::humantime::parse_duration(&raw).unwrap_or_else(|e| {
            warn!("Ignoring unparsable duration for {}: {:?} ({})", key, raw, e);
            default
        }),
        Err(_) => default,
    }
}

//! Data exchanged between the player, the metadata service and the session.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Custom field carrying the WordPress post id of the playing video.
pub const POST_ID_FIELD: &str = "wp_post_id";
/// Custom field carrying the WordPress content type of the playing video.
pub const CONTENT_TYPE_FIELD: &str = "sa_category";
/// Content type used when the player does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "sa_core_content";

/// The media item currently loaded in the player, as reported by its metadata.
/// Read-only for this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// The player's own identifier for the media, if any.
    #[serde(default)]
    pub id: Option<String>,
    /// Arbitrary custom fields supplied by the player.
    #[serde(default, rename = "customFields")]
    pub custom_fields: HashMap<String, Value>,
}

impl ContentItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_fields.insert(key.into(), value.into());
        self
    }

    /// The WordPress post id, accepting either a string or a number.
    /// An empty string counts as absent.
    pub fn post_id(&self) -> Option<String> {
        match self.custom_fields.get(POST_ID_FIELD)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &str {
        self.custom_fields
            .get(CONTENT_TYPE_FIELD)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// The recommended next video for a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedCandidate {
    #[serde(deserialize_with = "string_or_number")]
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
}

/// A video resolved by the catalog, ready to be loaded into the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl VideoRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// Catalog ids come back from WordPress as strings or bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for video_id, got {}",
            other
        ))),
    }
}

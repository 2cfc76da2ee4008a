//! Ports onto the host media player.
//!
//! The session never touches the player directly; it only goes through these
//! traits, which the embedding application implements.

use async_trait::async_trait;

use crate::content::VideoRef;
use crate::error::RelatedVideoResult;

/// Lookup of playable videos by catalog id.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve `video_id` into something the player can load. May fail.
    async fn get_video(&self, video_id: &str) -> RelatedVideoResult<VideoRef>;
}

/// Playback and chrome controls of the player instance.
#[async_trait]
pub trait PlayerControls: Send + Sync {
    /// Replace the current media with `video`.
    fn load(&self, video: &VideoRef) -> RelatedVideoResult<()>;

    /// Start playback of the loaded media.
    async fn play(&self) -> RelatedVideoResult<()>;

    fn hide_control_bar(&self);

    fn show_control_bar(&self);
}

//! Post-playback "related video" experience for a hosted media player.
//!
//! When playback of an item ends, the session shows an "up next" card with a
//! countdown over the player and, when the countdown runs out or the viewer
//! clicks the thumbnail, plays the recommended video. The recommendation is
//! fetched from the site's WordPress API when the item's metadata loads.
//!
//! The player, the document and the clock are reached through ports
//! ([`player`], [`render`], [`scheduler`]) so the embedding application
//! decides how they are backed.

pub mod config;
pub mod content;
pub mod error;
pub mod player;
pub mod recommendation;
pub mod render;
pub mod scheduler;
pub mod session;

pub use config::RelatedVideoConfig;
pub use content::{ContentItem, RelatedCandidate, VideoRef};
pub use error::{RelatedVideoError, RelatedVideoResult};
pub use player::{Catalog, PlayerControls};
pub use recommendation::wordpress::WordPressFetcher;
pub use recommendation::{RecommendationFetcher, RelatedPostsFetcher};
pub use render::{RenderPort, memory::MemoryDom};
pub use scheduler::{Scheduler, TokioScheduler};
pub use session::countdown::CountdownState;
pub use session::events::{SessionEvent, SessionHandle};
pub use session::{RelatedVideoSession, SessionPhase, SessionPorts};

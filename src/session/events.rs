//! Everything that can happen to a session arrives as a [`SessionEvent`] on
//! one channel, so the session handles them strictly one at a time.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::content::{ContentItem, RelatedCandidate};

/// Identifies one arm→advance cycle. Ticks and clicks carry the cycle they
/// were scheduled for, so anything left over from an earlier cycle is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle {}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The player loaded metadata for a new item.
    MetadataLoaded(ContentItem),
    /// A fetch started by the metadata load numbered `generation` finished.
    CandidateResolved {
        generation: u64,
        candidate: Option<RelatedCandidate>,
    },
    /// Playback of the current item reached the end.
    PlaybackEnded,
    /// One second of the countdown elapsed.
    CountdownTick(CycleId),
    /// The user clicked the overlay thumbnail.
    OverlayClicked(CycleId),
    /// The catalog lookup and playback start for a cycle finished, successfully or not.
    AdvanceSettled(CycleId),
    /// The player is being torn down.
    Disposed,
}

/// Cloneable handle the player uses to report lifecycle events.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub(crate) fn new(tx: UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    pub fn metadata_loaded(&self, item: ContentItem) {
        self.send(SessionEvent::MetadataLoaded(item));
    }

    pub fn playback_ended(&self) {
        self.send(SessionEvent::PlaybackEnded);
    }

    pub fn dispose(&self) {
        self.send(SessionEvent::Disposed);
    }

    /// Deliver an event. Once the session has stopped this is a no-op.
    pub fn send(&self, event: SessionEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Session is gone, dropping {:?}", e.0);
        }
    }
}

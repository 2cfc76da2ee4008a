//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across the integration tests

pub mod mocks;

use std::sync::Arc;

use mocks::{FakePlayer, ManualScheduler, MockCatalog, MockPostsFetcher};
use related_video::render::overlay::CONTAINER_ID;
use related_video::{
    Catalog, MemoryDom, RecommendationFetcher, RelatedVideoConfig, RelatedVideoSession,
    RenderPort, SessionHandle, SessionPorts,
};

/// A session wired to in-memory collaborators.
pub struct Harness {
    pub session: RelatedVideoSession,
    pub handle: SessionHandle,
    pub dom: Arc<MemoryDom>,
    pub player: Arc<FakePlayer>,
    pub scheduler: Arc<ManualScheduler>,
}

impl Harness {
    pub fn new(fetcher: MockPostsFetcher, catalog: impl Catalog + 'static) -> Self {
        Self::with_parts(
            fetcher,
            catalog,
            FakePlayer::new(),
            MemoryDom::new(),
        )
    }

    pub fn with_parts(
        fetcher: MockPostsFetcher,
        catalog: impl Catalog + 'static,
        player: FakePlayer,
        dom: MemoryDom,
    ) -> Self {
        let dom = Arc::new(dom);
        let player = Arc::new(player);
        let scheduler = Arc::new(ManualScheduler::new());

        let ports = SessionPorts {
            fetcher: Arc::new(RecommendationFetcher::new(Arc::new(fetcher))),
            catalog: Arc::new(catalog),
            controls: player.clone(),
            render: dom.clone(),
            scheduler: scheduler.clone(),
        };
        let (session, handle) = RelatedVideoSession::new(ports, RelatedVideoConfig::default());

        Self {
            session,
            handle,
            dom,
            player,
            scheduler,
        }
    }

    /// Report a metadata load and wait for its fetch result to be handled.
    pub async fn load(&mut self, item: related_video::ContentItem) {
        self.handle.metadata_loaded(item);
        assert!(self.session.step().await, "metadata load");
        assert!(self.session.step().await, "fetch result");
    }

    /// Report the end of playback and handle it.
    pub fn end_playback(&mut self) {
        self.handle.playback_ended();
        self.session.process_pending();
    }

    /// Fire the countdown timer once and handle the resulting events.
    pub fn tick(&mut self) -> usize {
        let fired = self.scheduler.fire();
        self.session.process_pending();
        fired
    }

    /// Wait for the catalog lookup and playback start of an advance to report back.
    pub async fn finish_advance(&mut self) {
        assert!(self.session.is_advancing(), "no advance in flight");
        assert!(self.session.step().await, "advance result");
        assert!(!self.session.is_advancing());
    }

    /// Click the overlay thumbnail, if it is showing.
    pub fn click_thumbnail(&self) -> usize {
        match self.session.overlay() {
            Some(overlay) => self.dom.click(overlay.thumbnail),
            None => 0,
        }
    }

    pub fn overlay_count(&self) -> usize {
        self.dom.count_by_id(CONTAINER_ID)
    }

    /// No overlay, no live timer, no listener, control bar visible.
    pub fn assert_pre_cycle_state(&self) {
        assert_eq!(self.overlay_count(), 0, "overlay left in the document");
        assert_eq!(self.scheduler.live_timers(), 0, "timer left running");
        assert_eq!(self.dom.listener_count(), 0, "click listener left attached");
        assert!(self.player.control_bar_visible(), "control bar hidden");
        assert!(!self.session.countdown().running);
        assert!(self.session.overlay().is_none());
        if let Some(root) = self.dom.player_container() {
            assert!(self.dom.children(root).is_empty());
        }
    }
}

/// Lets spawned tasks run until they block, or finish being aborted.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// A fetcher returning `candidate` for every item.
pub fn fetcher_returning(candidate: related_video::RelatedCandidate) -> MockPostsFetcher {
    let mut fetcher = MockPostsFetcher::new();
    fetcher
        .expect_fetch_related_posts()
        .returning(move |_| Ok(vec![candidate.clone()]));
    fetcher
}

/// A catalog resolving every id, expected to be asked exactly `times` times.
pub fn catalog_expecting(times: usize) -> MockCatalog {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_get_video()
        .times(times)
        .returning(|id| Ok(related_video::VideoRef::new(id)));
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_harness_is_idle() {
        let harness = Harness::new(MockPostsFetcher::new(), MockCatalog::new());
        harness.assert_pre_cycle_state();
    }
}

//! Test doubles for the ports the session drives

use async_trait::async_trait;
use mockall::mock;
use related_video::scheduler::{TickCallback, TimerHandle};
use related_video::{
    Catalog, ContentItem, PlayerControls, RelatedPostsFetcher, RelatedVideoError,
    RelatedVideoResult, Scheduler, VideoRef,
};
use related_video::recommendation::RelatedPostsResult;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mock! {
    pub Catalog {}

    #[async_trait]
    impl Catalog for Catalog {
        async fn get_video(&self, video_id: &str) -> RelatedVideoResult<VideoRef>;
    }
}

mock! {
    pub PostsFetcher {}

    #[async_trait]
    impl RelatedPostsFetcher for PostsFetcher {
        async fn fetch_related_posts(&self, item: &ContentItem) -> RelatedPostsResult;
    }
}

/// Player controls that record what they were asked to do.
pub struct FakePlayer {
    pub loaded: Mutex<Vec<VideoRef>>,
    pub plays: AtomicUsize,
    pub control_bar_visible: AtomicBool,
    pub fail_play: bool,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            loaded: Mutex::new(Vec::new()),
            plays: AtomicUsize::new(0),
            control_bar_visible: AtomicBool::new(true),
            fail_play: false,
        }
    }

    pub fn failing_play() -> Self {
        Self {
            fail_play: true,
            ..Self::new()
        }
    }

    pub fn loaded_ids(&self) -> Vec<String> {
        self.loaded
            .lock()
            .unwrap()
            .iter()
            .map(|v| v.id.clone())
            .collect()
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn control_bar_visible(&self) -> bool {
        self.control_bar_visible.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerControls for FakePlayer {
    fn load(&self, video: &VideoRef) -> RelatedVideoResult<()> {
        self.loaded.lock().unwrap().push(video.clone());
        Ok(())
    }

    async fn play(&self) -> RelatedVideoResult<()> {
        if self.fail_play {
            return Err(RelatedVideoError::Playback("autoplay blocked".to_string()));
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn hide_control_bar(&self) {
        self.control_bar_visible.store(false, Ordering::SeqCst);
    }

    fn show_control_bar(&self) {
        self.control_bar_visible.store(true, Ordering::SeqCst);
    }
}

/// Sets its flag when dropped, i.e. when the future holding it is abandoned.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Catalog whose lookups never complete.
#[derive(Default)]
pub struct StalledCatalog {
    started: Arc<AtomicBool>,
    abandoned: Arc<AtomicBool>,
}

impl StalledCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags reporting whether a lookup started and whether it was abandoned.
    pub fn flags(&self) -> (Arc<AtomicBool>, Arc<AtomicBool>) {
        (self.started.clone(), self.abandoned.clone())
    }
}

#[async_trait]
impl Catalog for StalledCatalog {
    async fn get_video(&self, _video_id: &str) -> RelatedVideoResult<VideoRef> {
        let _flag = DropFlag(self.abandoned.clone());
        self.started.store(true, Ordering::SeqCst);
        std::future::pending().await
    }
}

struct ManualTimer {
    on_tick: TickCallback,
    live: Arc<AtomicBool>,
}

/// Scheduler whose timers only fire when the test says so.
#[derive(Default)]
pub struct ManualScheduler {
    timers: Mutex<Vec<ManualTimer>>,
    periods: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live timer once, returning how many fired.
    pub fn fire(&self) -> usize {
        let callbacks: Vec<TickCallback> = self
            .timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.live.load(Ordering::SeqCst))
            .map(|t| t.on_tick.clone())
            .collect();

        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn live_timers(&self) -> usize {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.live.load(Ordering::SeqCst))
            .count()
    }

    pub fn scheduled(&self) -> usize {
        self.timers.lock().unwrap().len()
    }

    pub fn periods(&self) -> Vec<Duration> {
        self.periods.lock().unwrap().clone()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, on_tick: TickCallback) -> TimerHandle {
        let live = Arc::new(AtomicBool::new(true));
        self.timers.lock().unwrap().push(ManualTimer {
            on_tick,
            live: live.clone(),
        });
        self.periods.lock().unwrap().push(period);
        TimerHandle::new(move || live.store(false, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_mock_catalog() {
        let mut catalog = MockCatalog::new();

        catalog
            .expect_get_video()
            .with(eq("v-1"))
            .times(1)
            .returning(|id| Ok(VideoRef::new(id)));

        let video = catalog.get_video("v-1").await.unwrap();
        assert_eq!(video.id, "v-1");
    }

    #[test]
    fn test_manual_scheduler_cancel() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let handle = scheduler.schedule_repeating(
            Duration::from_secs(1),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(scheduler.fire(), 1);

        handle.cancel();
        assert_eq!(scheduler.fire(), 0);
        assert_eq!(scheduler.live_timers(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

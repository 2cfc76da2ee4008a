//! The related-video session: one per player instance.
//!
//! ```text
//!            playback ended (candidate held)
//!   IDLE ─────────────────────────────────────▶ ARMED
//!    ▲                                            │
//!    │  countdown reaches zero / user click       │
//!    ├──────────── advance ◀──────────────────────┤
//!    │                                            │
//!    └────────── disposed / DOM gone ─────────────┘
//! ```
//!
//! Every input is a [`SessionEvent`] read from a single channel and handled to
//! completion before the next one, so a tick can never interleave with an
//! advance. Leaving `ARMED` swaps the state out before anything else happens;
//! a tick or click that was already queued then finds a different state (or a
//! different [`CycleId`]) and is dropped.
//!
//! Nothing the session awaits comes from a collaborator. The recommendation
//! fetch and the catalog lookup that starts the next video both run on their
//! own tasks and report back through the channel, so a slow or stuck
//! collaborator never holds the overlay up or blocks `dispose`.

pub mod countdown;
pub mod events;

use std::mem;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RelatedVideoConfig;
use crate::content::{ContentItem, RelatedCandidate};
use crate::error::{RelatedVideoError, RelatedVideoResult};
use crate::player::{Catalog, PlayerControls};
use crate::recommendation::RecommendationFetcher;
use crate::render::overlay::OverlayHandle;
use crate::render::{ClickCallback, RenderPort};
use crate::scheduler::Scheduler;

use countdown::{Countdown, CountdownState};
use events::{CycleId, SessionEvent, SessionHandle};

/// The collaborators a session drives.
#[derive(Clone)]
pub struct SessionPorts {
    pub fetcher: Arc<RecommendationFetcher>,
    pub catalog: Arc<dyn Catalog>,
    pub controls: Arc<dyn PlayerControls>,
    pub render: Arc<dyn RenderPort>,
    pub scheduler: Arc<dyn Scheduler>,
}

/// Externally visible state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvanceTrigger {
    CountdownExpired,
    UserClick,
}

struct ActiveCycle {
    id: CycleId,
    candidate: RelatedCandidate,
    overlay: OverlayHandle,
}

enum SessionState {
    Idle,
    Armed(ActiveCycle),
}

pub struct RelatedVideoSession {
    config: RelatedVideoConfig,
    ports: SessionPorts,
    state: SessionState,
    countdown: Countdown,
    /// Candidate for the item currently loaded, waiting for playback to end.
    candidate: Option<RelatedCandidate>,
    /// Bumped on every metadata load; fetch results from older loads are stale.
    generation: u64,
    next_cycle: u64,
    fetch_task: Option<JoinHandle<()>>,
    /// Catalog lookup and playback start of the last advance, until it settles.
    playback_task: Option<(CycleId, JoinHandle<()>)>,
    disposed: bool,
    tx: UnboundedSender<SessionEvent>,
    rx: UnboundedReceiver<SessionEvent>,
}

impl RelatedVideoSession {
    pub fn new(ports: SessionPorts, config: RelatedVideoConfig) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(tx.clone());
        let session = Self {
            countdown: Countdown::new(config.countdown_seconds),
            config,
            ports,
            state: SessionState::Idle,
            candidate: None,
            generation: 0,
            next_cycle: 1,
            fetch_task: None,
            playback_task: None,
            disposed: false,
            tx,
            rx,
        };
        (session, handle)
    }

    /// Another handle onto this session's event channel.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.tx.clone())
    }

    /// Run the session on its own task until it is disposed.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Handle events until the session is disposed.
    pub async fn run(mut self) {
        info!("Related video session started");
        while self.step().await {}
        info!("Related video session stopped");
    }

    /// Wait for the next event and handle it. Returns `false` once disposed.
    pub async fn step(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                !self.disposed
            }
            None => false,
        }
    }

    /// Handle every event already queued, without waiting for more.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while !self.disposed {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.dispatch(event);
                    handled += 1;
                }
                Err(_) => break,
            }
        }
        handled
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        if self.disposed {
            debug!("Session disposed, ignoring {:?}", event);
            return;
        }

        match event {
            SessionEvent::MetadataLoaded(item) => self.on_metadata_loaded(item),
            SessionEvent::CandidateResolved {
                generation,
                candidate,
            } => self.on_candidate_resolved(generation, candidate),
            SessionEvent::PlaybackEnded => self.on_playback_ended(),
            SessionEvent::CountdownTick(cycle) => self.on_countdown_tick(cycle),
            SessionEvent::OverlayClicked(cycle) => self.on_overlay_clicked(cycle),
            SessionEvent::AdvanceSettled(cycle) => self.on_advance_settled(cycle),
            SessionEvent::Disposed => self.dispose(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Armed(_) => SessionPhase::Armed,
        }
    }

    pub fn countdown(&self) -> CountdownState {
        self.countdown.state()
    }

    pub fn candidate(&self) -> Option<&RelatedCandidate> {
        self.candidate.as_ref()
    }

    /// The live overlay, present only while armed.
    pub fn overlay(&self) -> Option<&OverlayHandle> {
        match &self.state {
            SessionState::Armed(active) => Some(&active.overlay),
            SessionState::Idle => None,
        }
    }

    /// Whether the next video is still being looked up or started.
    pub fn is_advancing(&self) -> bool {
        self.playback_task.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Builds a callback that posts `event` back onto this session's channel.
    fn notifier(&self, event: SessionEvent) -> ClickCallback {
        let tx = self.tx.clone();
        Arc::new(move || {
            if tx.send(event.clone()).is_err() {
                debug!("Session is gone, dropping {:?}", event);
            }
        })
    }

    fn on_metadata_loaded(&mut self, item: ContentItem) {
        self.generation += 1;
        self.candidate = None;

        if let Some(previous) = self.fetch_task.take() {
            debug!("Abandoning related video lookup for an earlier load");
            previous.abort();
        }

        let generation = self.generation;
        let fetcher = self.ports.fetcher.clone();
        let tx = self.tx.clone();

        // The fetch runs beside the session so ticks and clicks keep flowing.
        self.fetch_task = Some(tokio::spawn(async move {
            let candidate = fetcher.resolve_candidate(&item).await;
            if let Err(e) = tx.send(SessionEvent::CandidateResolved {
                generation,
                candidate,
            }) {
                debug!("Session is gone, dropping fetch result: {:?}", e.0);
            }
        }));
    }

    fn on_candidate_resolved(&mut self, generation: u64, candidate: Option<RelatedCandidate>) {
        if generation != self.generation {
            debug!(
                "Discarding related video from load {} (current load is {})",
                generation, self.generation
            );
            return;
        }
        self.fetch_task = None;
        self.candidate = candidate;
    }

    fn on_playback_ended(&mut self) {
        if matches!(self.state, SessionState::Armed(_)) {
            warn!("Playback ended while the related video overlay is up, re-arming");
            let previous = self.cancel_cycle();
            if self.candidate.is_none() {
                self.candidate = previous;
            }
        }

        let Some(candidate) = self.candidate.take() else {
            warn!("No related video available.");
            return;
        };

        let render = self.ports.render.clone();
        let mut overlay = match OverlayHandle::render(
            render.as_ref(),
            &candidate,
            self.config.countdown_seconds,
            self.config.thumbnail_width,
        ) {
            Ok(overlay) => overlay,
            Err(e) => {
                error!("Unable to show related video overlay: {}", e);
                self.candidate = Some(candidate);
                return;
            }
        };

        self.ports.controls.hide_control_bar();

        let cycle = CycleId(self.next_cycle);
        self.next_cycle += 1;

        if let Err(e) = overlay.listen(
            render.as_ref(),
            self.notifier(SessionEvent::OverlayClicked(cycle)),
        ) {
            error!("Next video element not found: {}", e);
        }

        let timer = self.ports.scheduler.schedule_repeating(
            self.config.tick_interval,
            self.notifier(SessionEvent::CountdownTick(cycle)),
        );
        self.countdown.arm(timer);

        info!(
            "Armed {}: \"{}\" ({}) plays in {}s",
            cycle, candidate.title, candidate.video_id, self.config.countdown_seconds
        );
        self.state = SessionState::Armed(ActiveCycle {
            id: cycle,
            candidate,
            overlay,
        });
    }

    fn on_countdown_tick(&mut self, cycle: CycleId) {
        let render = self.ports.render.clone();

        let outcome = match &self.state {
            SessionState::Armed(active) if active.id == cycle && self.countdown.is_running() => {
                let remaining = self.countdown.tick();
                if active.overlay.is_intact(render.as_ref()) {
                    active
                        .overlay
                        .show_remaining(render.as_ref(), remaining)
                        .map(|_| remaining)
                } else {
                    Err(RelatedVideoError::MissingElement(
                        "timer or next video container".to_string(),
                    ))
                }
            }
            _ => {
                debug!("Ignoring countdown tick for {}", cycle);
                return;
            }
        };

        match outcome {
            Ok(0) => self.advance(AdvanceTrigger::CountdownExpired),
            Ok(remaining) => debug!("{}: {}s left", cycle, remaining),
            Err(e) => {
                error!("Countdown for {} stopped: {}", cycle, e);
                self.cancel_cycle();
            }
        }
    }

    fn on_overlay_clicked(&mut self, cycle: CycleId) {
        match &self.state {
            SessionState::Armed(active) if active.id == cycle => {}
            _ => {
                debug!("Ignoring overlay click for {}", cycle);
                return;
            }
        }
        self.advance(AdvanceTrigger::UserClick);
    }

    /// Restore the normal player UI and start the held candidate.
    ///
    /// The timer, listener and overlay are gone and the control bar is back
    /// before this returns. The catalog lookup and playback start run on their
    /// own task, which posts [`SessionEvent::AdvanceSettled`] when done.
    fn advance(&mut self, trigger: AdvanceTrigger) {
        let ActiveCycle {
            id,
            candidate,
            overlay,
        } = match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Armed(active) => active,
            SessionState::Idle => return,
        };

        self.countdown.cancel();
        overlay.remove(self.ports.render.as_ref());
        self.ports.controls.show_control_bar();

        info!("Advancing {} to {} ({:?})", id, candidate.video_id, trigger);

        if let Some((previous, task)) = self.playback_task.take() {
            debug!("Superseding pending playback for {}", previous);
            task.abort();
        }

        let catalog = self.ports.catalog.clone();
        let controls = self.ports.controls.clone();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = start_playback(catalog.as_ref(), controls.as_ref(), &candidate).await {
                error!("Error loading next video {}: {}", candidate.video_id, e);
            }
            if tx.send(SessionEvent::AdvanceSettled(id)).is_err() {
                debug!("Session is gone, dropping advance result for {}", id);
            }
        });
        self.playback_task = Some((id, task));
    }

    fn on_advance_settled(&mut self, cycle: CycleId) {
        match &self.playback_task {
            Some((pending, _)) if *pending == cycle => {
                self.playback_task = None;
                debug!("Advance for {} settled", cycle);
            }
            _ => debug!("Ignoring settled advance for {}", cycle),
        }
    }

    /// Tear down the current cycle without playing anything, handing back
    /// the candidate it held.
    fn cancel_cycle(&mut self) -> Option<RelatedCandidate> {
        self.countdown.cancel();
        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Armed(active) => {
                active.overlay.remove(self.ports.render.as_ref());
                self.ports.controls.show_control_bar();
                debug!("Cancelled {}", active.id);
                Some(active.candidate)
            }
            SessionState::Idle => None,
        }
    }

    /// Release the timer, listener and overlay and abandon any lookup still
    /// in flight. Safe to call repeatedly and from any state; every later
    /// event is ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            debug!("Related video session already disposed");
            return;
        }
        self.cancel_cycle();
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if let Some((cycle, task)) = self.playback_task.take() {
            debug!("Abandoning playback for {}", cycle);
            task.abort();
        }
        self.candidate = None;
        self.generation += 1;
        self.disposed = true;
        info!("Related video session disposed");
    }
}

async fn start_playback(
    catalog: &dyn Catalog,
    controls: &dyn PlayerControls,
    candidate: &RelatedCandidate,
) -> RelatedVideoResult<()> {
    let video = catalog.get_video(&candidate.video_id).await?;
    controls.load(&video)?;
    controls.play().await?;
    Ok(())
}

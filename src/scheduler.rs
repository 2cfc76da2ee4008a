//! Clock port for the countdown: schedule a repeating callback, cancel it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Invoked once per period until the timer is cancelled.
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Owns a live repeating timer. Cancelling, or dropping, stops it.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

pub trait Scheduler: Send + Sync {
    /// Call `on_tick` every `period`, starting one period from now.
    fn schedule_repeating(&self, period: Duration, on_tick: TickCallback) -> TimerHandle;
}

/// Runs each timer as a tokio task driven by `tokio::time::interval`.
///
/// Must be used from within a tokio runtime. Paused test time drives it too.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, on_tick: TickCallback) -> TimerHandle {
        let start = Instant::now() + period;
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(start, period);
            // A late tick should not be followed by a burst of catch-up ticks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });

        TimerHandle::new(move || {
            debug!("Cancelling countdown timer");
            task.abort();
        })
    }
}

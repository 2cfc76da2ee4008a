use crate::scheduler::TimerHandle;

/// Snapshot of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    pub remaining_seconds: u32,
    pub running: bool,
}

/// The countdown and the timer driving it.
///
/// `running` is derived from holding a timer handle, so a running countdown
/// always owns a live timer and a stopped one owns none.
#[derive(Debug)]
pub struct Countdown {
    length: u32,
    remaining: u32,
    timer: Option<TimerHandle>,
}

impl Countdown {
    pub fn new(length: u32) -> Self {
        Self {
            length,
            remaining: length,
            timer: None,
        }
    }

    /// Start counting from the full length, driven by `timer`.
    /// Any previous timer is cancelled first.
    pub fn arm(&mut self, timer: TimerHandle) {
        self.cancel();
        self.timer = Some(timer);
    }

    /// Stop the timer and reset to the full length. Safe in any state.
    pub fn cancel(&mut self) {
        self.remaining = self.length;
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Count down one second and return what is left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn state(&self) -> CountdownState {
        CountdownState {
            remaining_seconds: self.remaining,
            running: self.is_running(),
        }
    }
}

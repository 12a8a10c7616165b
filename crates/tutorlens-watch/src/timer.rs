use core::time::Duration;
use tokio::time::Instant;

/// Cancellable trailing-edge timer.
///
/// Every `schedule` pushes the deadline to `now + window`; `poll` fires at
/// most once per scheduled deadline. There is no maximum wait, so a steady
/// stream of `schedule` calls postpones firing indefinitely.
#[derive(Debug, Clone)]
pub struct QuiescenceTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl QuiescenceTimer {
    /// Creates an idle timer with the given quiescence window.
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Quiescence window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Starts the window, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Cancels the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Pending deadline, if any.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a deadline is pending.
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires if the deadline has passed, clearing it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

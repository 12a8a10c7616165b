use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::gate::ChangeGate;
use crate::source::PromptSource;

/// Inbound notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The observed document changed in some way
    ContentChanged,
    /// The user closed or resolved the advisory
    AdvisoryDismissed,
}

/// Runs a [`ChangeGate`] on one task.
///
/// Host signals and the quiescence deadline are multiplexed on a single
/// loop, so classification never interleaves with another notification.
#[derive(Debug)]
pub struct GateDriver<S> {
    gate: ChangeGate<S>,
}

impl<S: PromptSource> GateDriver<S> {
    /// Wraps a gate.
    pub const fn new(gate: ChangeGate<S>) -> Self {
        Self { gate }
    }

    /// Processes signals until the sender side closes, then lets a pending
    /// window elapse and returns the gate.
    pub async fn run(mut self, mut signals: UnboundedReceiver<HostSignal>) -> ChangeGate<S> {
        loop {
            let deadline = self.gate.deadline();
            tokio::select! {
                signal = signals.recv() => match signal {
                    Some(HostSignal::ContentChanged) => self.gate.on_change(Instant::now()),
                    Some(HostSignal::AdvisoryDismissed) => {
                        self.gate.dismiss_advisory();
                    }
                    None => break,
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.poll();
                }
            }
        }

        if let Some(deadline) = self.gate.deadline() {
            sleep_until(deadline).await;
            self.poll();
        }
        debug!("host signals closed; gate driver stopped");
        self.gate
    }

    fn poll(&mut self) {
        if let Some(outcome) = self.gate.poll(Instant::now()) {
            debug!(?outcome, "quiescence window elapsed");
        }
    }
}

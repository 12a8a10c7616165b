//! Observation pipeline for prompt classification.
//!
//! Change notifications from the host pass through a [`ChangeGate`], which
//! waits for a quiescence window, deduplicates and length-checks the latest
//! user text, classifies it and hands the result to an [`AdvisoryTrigger`].
//! [`GateDriver`] runs the gate on a tokio task.
#![cfg_attr(
    test,
    allow(
        clippy::missing_panics_doc,
        clippy::assertions_on_result_states,
        reason = "Allow for tests"
    )
)]

/// Async event loop around the gate.
pub mod driver;
/// Error types and result definitions.
pub mod error;
/// Quiescence gating and extraction.
pub mod gate;
/// Host query surface.
pub mod source;
/// Observation state.
pub mod state;
/// Cancellable quiescence timer.
pub mod timer;
/// Advisory decisions and events.
pub mod trigger;
/// Dormant usage counters.
pub mod usage;

pub use driver::{GateDriver, HostSignal};
pub use error::{Result, WatchError};
pub use gate::{ChangeGate, GateOutcome};
pub use source::PromptSource;
pub use state::ObservationState;
pub use timer::QuiescenceTimer;
pub use trigger::{
    Advisory, AdvisoryChannel, AdvisoryEvent, AdvisoryTrigger, DEFAULT_SUGGESTED_PROMPT,
    DEFAULT_WARNING_MESSAGE, TriggerOutcome,
};
pub use usage::{UsageCounts, UsageStore};

//! Host adapters for the `tutorlens` binary
//!
//! Exposes the transcript source, file observer and console presenter for
//! integration testing
#![cfg_attr(
    test,
    allow(
        clippy::missing_panics_doc,
        clippy::assertions_on_result_states,
        reason = "Allow for tests"
    )
)]

/// File-system observer for the transcript.
pub mod observer;
/// Console rendering of advisories.
pub mod presenter;
/// JSONL transcript reading.
pub mod transcript;

pub use observer::{wait_for_target, watch_transcript};
pub use presenter::{AdvisoryChoice, ConsolePresenter};
pub use transcript::{TranscriptSource, latest_user_text};

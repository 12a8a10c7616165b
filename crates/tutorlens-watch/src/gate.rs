use tokio::time::Instant;
use tracing::{debug, trace};
use tutorlens_core::{AnalysisResult, Classifier, GateConfig};

use crate::source::PromptSource;
use crate::state::ObservationState;
use crate::timer::QuiescenceTimer;
use crate::trigger::{AdvisoryTrigger, TriggerOutcome};

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The host has no user message
    NoText,
    /// Same text as the last classification
    Duplicate,
    /// Text below the minimum length
    TooShort {
        /// Length in characters
        chars: usize,
    },
    /// Text was classified and handed to the trigger
    Classified {
        /// Classification of the text
        result: AnalysisResult,
        /// What the trigger did with it
        trigger: TriggerOutcome,
    },
}

/// Turns bursty change notifications into at most one classification per
/// quiescence window, skipping text it has already classified.
#[derive(Debug)]
pub struct ChangeGate<S> {
    source: S,
    classifier: Classifier,
    trigger: AdvisoryTrigger,
    timer: QuiescenceTimer,
    min_prompt_chars: usize,
    state: ObservationState,
}

impl<S: PromptSource> ChangeGate<S> {
    /// Creates a gate with fresh observation state.
    pub fn new(
        source: S,
        classifier: Classifier,
        trigger: AdvisoryTrigger,
        config: &GateConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            trigger,
            timer: QuiescenceTimer::new(config.quiescence_window()),
            min_prompt_chars: config.min_prompt_chars,
            state: ObservationState::default(),
        }
    }

    /// Handles a change notification by restarting the quiescence window.
    pub fn on_change(&mut self, now: Instant) {
        trace!(
            restarted = self.timer.is_pending(),
            window = ?self.timer.window(),
            "content changed"
        );
        self.timer.schedule(now);
    }

    /// When the pending window elapses, if one is pending.
    pub const fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Runs the extraction if the window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<GateOutcome> {
        self.timer
            .poll(now)
            .then(|| self.extract_and_classify())
    }

    /// Reads the latest user text and classifies it unless it is absent,
    /// already classified, or too short.
    pub fn extract_and_classify(&mut self) -> GateOutcome {
        let Some(raw) = self.source.latest_user_text() else {
            debug!("no user message found");
            return GateOutcome::NoText;
        };
        let text = raw.trim();
        if text.is_empty() {
            debug!("latest user message is blank");
            return GateOutcome::NoText;
        }

        if self.state.is_duplicate(text) {
            debug!("prompt unchanged since last classification");
            return GateOutcome::Duplicate;
        }

        let chars = text.chars().count();
        if chars < self.min_prompt_chars {
            debug!(chars, min = self.min_prompt_chars, "prompt too short to classify");
            return GateOutcome::TooShort { chars };
        }

        self.state.remember(text);
        let result = self.classifier.classify(text);
        let trigger = self.trigger.on_result(&mut self.state, &result, text);
        GateOutcome::Classified { result, trigger }
    }

    /// Handles the presentation layer closing the advisory.
    pub fn dismiss_advisory(&mut self) -> bool {
        self.trigger.dismiss(&mut self.state)
    }

    /// Current observation state.
    pub const fn state(&self) -> &ObservationState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{AdvisoryChannel, AdvisoryEvent};
    use core::cell::{Cell, RefCell};
    use core::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tutorlens_core::{AdaptiveKind, PatternKind};

    #[derive(Default)]
    struct FakeSource {
        text: RefCell<Option<String>>,
        queries: Cell<usize>,
    }

    impl FakeSource {
        fn set(&self, text: &str) {
            *self.text.borrow_mut() = Some(text.to_owned());
        }
    }

    impl PromptSource for &FakeSource {
        fn latest_user_text(&self) -> Option<String> {
            self.queries.set(self.queries.get() + 1);
            self.text.borrow().clone()
        }
    }

    fn gate(source: &FakeSource) -> (ChangeGate<&FakeSource>, UnboundedReceiver<AdvisoryEvent>) {
        let classifier = match Classifier::builtin() {
            Ok(classifier) => classifier,
            Err(error) => panic!("built-in rules must compile: {error}"),
        };
        let (channel, events) = AdvisoryChannel::new();
        let gate = ChangeGate::new(
            source,
            classifier,
            AdvisoryTrigger::new(channel),
            &GateConfig::default(),
        );
        (gate, events)
    }

    #[test]
    fn test_burst_fires_once_after_last_change() {
        let source = FakeSource::default();
        source.set("Can you write the solution for binary search?");
        let (mut gate, _events) = gate(&source);
        let start = Instant::now();

        for step in 0..10 {
            let now = start + Duration::from_millis(step * 100);
            gate.on_change(now);
            assert!(gate.poll(now).is_none());
        }

        let last = start + Duration::from_millis(900);
        assert!(gate.poll(last + Duration::from_millis(499)).is_none());
        assert_eq!(source.queries.get(), 0);

        let outcome = gate.poll(last + Duration::from_millis(500));
        assert!(matches!(outcome, Some(GateOutcome::Classified { .. })));
        assert_eq!(source.queries.get(), 1);
        assert!(gate.poll(last + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_missing_text_is_silent() {
        let source = FakeSource::default();
        let (mut gate, mut events) = gate(&source);

        assert_eq!(gate.extract_and_classify(), GateOutcome::NoText);
        assert!(gate.state().last_classified_text().is_none());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_duplicate_text_classified_once() {
        let source = FakeSource::default();
        source.set("Can you explain how recursion works?");
        let (mut gate, _events) = gate(&source);

        assert!(matches!(
            gate.extract_and_classify(),
            GateOutcome::Classified { .. }
        ));
        assert_eq!(gate.extract_and_classify(), GateOutcome::Duplicate);
        assert_eq!(
            gate.state().last_classified_text(),
            Some("Can you explain how recursion works?")
        );
    }

    #[test]
    fn test_minimum_length_boundary() {
        let source = FakeSource::default();
        let (mut gate, _events) = gate(&source);

        source.set("abcdefghijklmn");
        assert_eq!(
            gate.extract_and_classify(),
            GateOutcome::TooShort { chars: 14 }
        );
        assert!(gate.state().last_classified_text().is_none());

        source.set("abcdefghijklmno");
        assert!(matches!(
            gate.extract_and_classify(),
            GateOutcome::Classified { .. }
        ));
        assert_eq!(gate.state().last_classified_text(), Some("abcdefghijklmno"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let source = FakeSource::default();
        let (mut gate, _events) = gate(&source);

        source.set("Can you explain how recursion works?");
        assert!(matches!(
            gate.extract_and_classify(),
            GateOutcome::Classified { .. }
        ));
        source.set("  Can you explain how recursion works?\n\t");
        assert_eq!(gate.extract_and_classify(), GateOutcome::Duplicate);

        source.set("   abcdefghijklmn    ");
        assert_eq!(
            gate.extract_and_classify(),
            GateOutcome::TooShort { chars: 14 }
        );
        assert_eq!(
            gate.state().last_classified_text(),
            Some("Can you explain how recursion works?")
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let source = FakeSource::default();
        let (mut gate, _events) = gate(&source);

        source.set("ééééééééééééé?");
        assert_eq!(
            gate.extract_and_classify(),
            GateOutcome::TooShort { chars: 14 }
        );
    }

    #[test]
    fn test_advisory_mutual_exclusion() {
        let source = FakeSource::default();
        let (mut gate, mut events) = gate(&source);

        source.set("Can you write the solution for binary search?");
        gate.extract_and_classify();
        assert!(gate.state().advisory_active());
        assert!(matches!(events.try_recv(), Ok(AdvisoryEvent::Show(_))));

        source.set("Just give me the answer to question two");
        assert!(matches!(
            gate.extract_and_classify(),
            GateOutcome::Classified {
                trigger: TriggerOutcome::Suppressed,
                ..
            }
        ));
        assert!(events.try_recv().is_err());

        assert!(gate.dismiss_advisory());
        source.set("Now write the code for merge sort please");
        gate.extract_and_classify();
        assert!(matches!(events.try_recv(), Ok(AdvisoryEvent::Show(_))));
    }

    #[test]
    fn test_adaptive_prompt_raises_no_advisory() {
        let source = FakeSource::default();
        source.set("Is my approach to this correct?");
        let (mut gate, mut events) = gate(&source);

        let outcome = gate.extract_and_classify();
        assert!(matches!(
            outcome,
            GateOutcome::Classified {
                trigger: TriggerOutcome::AdaptiveObserved,
                ..
            }
        ));
        assert!(!gate.state().advisory_active());
        match events.try_recv() {
            Ok(AdvisoryEvent::AdaptiveObserved { kinds }) => {
                assert!(kinds.contains(&PatternKind::Adaptive(
                    AdaptiveKind::VerificationRequest
                )));
            }
            other => panic!("expected adaptive event, got {other:?}"),
        }
    }
}

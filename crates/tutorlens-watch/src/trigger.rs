use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tutorlens_core::{AnalysisResult, Category, PatternKind};

use crate::state::ObservationState;
use crate::usage::UsageStore;

/// Warning shown if an executive result arrives without any match.
pub const DEFAULT_WARNING_MESSAGE: &str =
    "This prompt asks the assistant for a finished answer instead of help learning.";
/// Replacement prompt offered when no matching rule supplies one.
pub const DEFAULT_SUGGESTED_PROMPT: &str =
    "Can you guide me through solving this step by step without giving me the final answer?";

/// Payload handed to the presentation layer when an advisory should be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// Kind of the first executive match
    pub kind: Option<PatternKind>,
    /// Warning text
    pub warning_message: String,
    /// Better-learning prompt to offer instead
    pub suggested_prompt: String,
    /// Prompt text that raised the advisory
    pub source_text: String,
}

/// Event sent to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryEvent {
    /// Show an advisory panel
    Show(Advisory),
    /// Adaptive prompt seen; informational only, nothing is surfaced
    AdaptiveObserved {
        /// Adaptive kinds that matched
        kinds: Vec<PatternKind>,
    },
}

/// What the trigger did with a classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// An advisory was already active; nothing emitted
    Suppressed,
    /// An advisory was emitted
    Shown,
    /// An informational adaptive event was emitted
    AdaptiveObserved,
    /// Nothing matched; nothing emitted
    Ignored,
}

/// Outbound channel to the presentation layer.
#[derive(Debug, Clone)]
pub struct AdvisoryChannel {
    sender: mpsc::UnboundedSender<AdvisoryEvent>,
}

impl AdvisoryChannel {
    /// Creates a channel and the receiver the presentation layer reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AdvisoryEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Sends an event; a closed presentation layer is not an error.
    pub fn send(&self, event: AdvisoryEvent) {
        if self.sender.send(event).is_err() {
            debug!("presentation layer closed; advisory event dropped");
        }
    }
}

/// Decides whether a classification result surfaces an advisory.
#[derive(Debug)]
pub struct AdvisoryTrigger {
    channel: AdvisoryChannel,
    usage: Option<Arc<UsageStore>>,
}

impl AdvisoryTrigger {
    /// Creates a trigger emitting into `channel`, with usage counting off.
    pub const fn new(channel: AdvisoryChannel) -> Self {
        Self {
            channel,
            usage: None,
        }
    }

    /// Counts emitted events in `store`.
    #[must_use]
    pub fn with_usage_store(mut self, store: Arc<UsageStore>) -> Self {
        self.usage = Some(store);
        self
    }

    /// Handles a classification of `source_text`.
    ///
    /// At most one advisory is active at a time. Executive results win over
    /// adaptive ones when both flags are set.
    pub fn on_result(
        &self,
        state: &mut ObservationState,
        result: &AnalysisResult,
        source_text: &str,
    ) -> TriggerOutcome {
        if state.advisory_active() {
            debug!("advisory already active; result not surfaced");
            return TriggerOutcome::Suppressed;
        }

        if result.is_executive {
            state.activate_advisory();
            let first = result.first_executive();
            let advisory = Advisory {
                kind: first.map(|pattern| pattern.kind),
                warning_message: first.map_or_else(
                    || DEFAULT_WARNING_MESSAGE.to_owned(),
                    |pattern| pattern.message.clone(),
                ),
                suggested_prompt: result
                    .first_suggestion()
                    .unwrap_or(DEFAULT_SUGGESTED_PROMPT)
                    .to_owned(),
                source_text: source_text.to_owned(),
            };
            info!(
                kind = ?advisory.kind,
                matches = result.executive_matches.len(),
                "executive help-seeking detected; showing advisory"
            );
            self.record(Category::Executive);
            self.channel.send(AdvisoryEvent::Show(advisory));
            TriggerOutcome::Shown
        } else if result.is_adaptive {
            let kinds: Vec<PatternKind> = result
                .adaptive_matches
                .iter()
                .map(|pattern| pattern.kind)
                .collect();
            info!(?kinds, "adaptive help-seeking detected");
            self.record(Category::Adaptive);
            self.channel.send(AdvisoryEvent::AdaptiveObserved { kinds });
            TriggerOutcome::AdaptiveObserved
        } else {
            TriggerOutcome::Ignored
        }
    }

    /// Handles the presentation layer closing the advisory.
    ///
    /// Returns whether an advisory was active.
    pub fn dismiss(&self, state: &mut ObservationState) -> bool {
        let was_active = state.clear_advisory();
        if was_active {
            debug!("advisory dismissed");
        }
        was_active
    }

    fn record(&self, category: Category) {
        if let Some(store) = &self.usage {
            store.record_detached(category);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorlens_core::{Classifier, DetectedPattern, ExecutiveKind};

    fn executive_result(message: &str, suggestion: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            is_executive: true,
            is_adaptive: false,
            executive_matches: vec![DetectedPattern {
                kind: PatternKind::Executive(ExecutiveKind::SolutionRequest),
                message: message.to_owned(),
            }],
            adaptive_matches: Vec::new(),
            suggestions: suggestion.map(str::to_owned).into_iter().collect(),
        }
    }

    #[test]
    fn test_executive_result_shows_advisory() {
        let (channel, mut events) = AdvisoryChannel::new();
        let trigger = AdvisoryTrigger::new(channel);
        let mut state = ObservationState::default();

        let outcome = trigger.on_result(
            &mut state,
            &executive_result("full solution", Some("ask for a hint")),
            "give me the full solution",
        );

        assert_eq!(outcome, TriggerOutcome::Shown);
        assert!(state.advisory_active());
        match events.try_recv() {
            Ok(AdvisoryEvent::Show(advisory)) => {
                assert_eq!(advisory.warning_message, "full solution");
                assert_eq!(advisory.suggested_prompt, "ask for a hint");
                assert_eq!(advisory.source_text, "give me the full solution");
            }
            other => panic!("expected advisory, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_suggestion_uses_default() {
        let (channel, mut events) = AdvisoryChannel::new();
        let trigger = AdvisoryTrigger::new(channel);
        let mut state = ObservationState::default();

        trigger.on_result(&mut state, &executive_result("solve", None), "solve it");

        match events.try_recv() {
            Ok(AdvisoryEvent::Show(advisory)) => {
                assert_eq!(advisory.suggested_prompt, DEFAULT_SUGGESTED_PROMPT);
            }
            other => panic!("expected advisory, got {other:?}"),
        }
    }

    #[test]
    fn test_executive_flag_without_matches_uses_defaults() {
        let (channel, mut events) = AdvisoryChannel::new();
        let trigger = AdvisoryTrigger::new(channel);
        let mut state = ObservationState::default();
        let result = AnalysisResult {
            is_executive: true,
            ..AnalysisResult::default()
        };

        trigger.on_result(&mut state, &result, "text");

        match events.try_recv() {
            Ok(AdvisoryEvent::Show(advisory)) => {
                assert!(advisory.kind.is_none());
                assert_eq!(advisory.warning_message, DEFAULT_WARNING_MESSAGE);
                assert_eq!(advisory.suggested_prompt, DEFAULT_SUGGESTED_PROMPT);
            }
            other => panic!("expected advisory, got {other:?}"),
        }
    }

    #[test]
    fn test_active_advisory_suppresses_second() {
        let (channel, mut events) = AdvisoryChannel::new();
        let trigger = AdvisoryTrigger::new(channel);
        let mut state = ObservationState::default();
        let result = executive_result("full solution", Some("hint"));

        assert_eq!(trigger.on_result(&mut state, &result, "one"), TriggerOutcome::Shown);
        assert_eq!(
            trigger.on_result(&mut state, &result, "two"),
            TriggerOutcome::Suppressed
        );
        assert!(matches!(events.try_recv(), Ok(AdvisoryEvent::Show(_))));
        assert!(events.try_recv().is_err());

        assert!(trigger.dismiss(&mut state));
        assert_eq!(trigger.on_result(&mut state, &result, "three"), TriggerOutcome::Shown);
        assert!(matches!(events.try_recv(), Ok(AdvisoryEvent::Show(_))));
    }

    #[test]
    fn test_unclassified_result_is_ignored() {
        let (channel, mut events) = AdvisoryChannel::new();
        let trigger = AdvisoryTrigger::new(channel);
        let mut state = ObservationState::default();

        let outcome = trigger.on_result(&mut state, &AnalysisResult::default(), "hello there");

        assert_eq!(outcome, TriggerOutcome::Ignored);
        assert!(events.try_recv().is_err());
        assert!(!trigger.dismiss(&mut state));
    }

    #[test]
    fn test_closed_channel_is_not_an_error() {
        let (channel, events) = AdvisoryChannel::new();
        drop(events);
        let trigger = AdvisoryTrigger::new(channel);
        let mut state = ObservationState::default();

        let outcome = trigger.on_result(&mut state, &executive_result("msg", None), "text");
        assert_eq!(outcome, TriggerOutcome::Shown);
    }

    #[test]
    fn test_default_suggestion_is_not_executive() {
        let classifier = match Classifier::builtin() {
            Ok(classifier) => classifier,
            Err(error) => panic!("built-in rules must compile: {error}"),
        };
        assert!(!classifier.classify(DEFAULT_SUGGESTED_PROMPT).is_executive);
    }
}

use core::mem;

/// Observation state shared by the change gate and the advisory trigger.
///
/// One instance lives inside each [`ChangeGate`](crate::ChangeGate); the
/// classifier never sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationState {
    last_classified_text: Option<String>,
    advisory_active: bool,
}

impl ObservationState {
    /// Text most recently handed to the classifier.
    pub fn last_classified_text(&self) -> Option<&str> {
        self.last_classified_text.as_deref()
    }

    /// Whether an advisory is currently shown.
    pub const fn advisory_active(&self) -> bool {
        self.advisory_active
    }

    /// Whether `text` was the last text classified.
    pub(crate) fn is_duplicate(&self, text: &str) -> bool {
        self.last_classified_text.as_deref() == Some(text)
    }

    pub(crate) fn remember(&mut self, text: &str) {
        self.last_classified_text = Some(text.to_owned());
    }

    /// Marks an advisory as shown. Returns false if one already was.
    pub(crate) fn activate_advisory(&mut self) -> bool {
        !mem::replace(&mut self.advisory_active, true)
    }

    /// Clears the advisory flag. Returns whether one was active.
    pub(crate) fn clear_advisory(&mut self) -> bool {
        mem::replace(&mut self.advisory_active, false)
    }
}

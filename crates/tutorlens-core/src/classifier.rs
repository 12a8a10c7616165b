//! Rule-driven classification of a single prompt.

use tracing::trace;

use crate::error::Result;
use crate::rules::{Rule, RuleSet};
use crate::types::{AnalysisResult, DetectedPattern};

/// Classifies prompt text against a fixed rule set.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    /// Creates a classifier over the given rules.
    pub const fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Creates a classifier over the built-in rules.
    ///
    /// # Errors
    /// Returns an error if a built-in pattern fails to compile.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(RuleSet::builtin()?))
    }

    /// Classifies `text`.
    ///
    /// Every rule of both lists is evaluated; nothing short-circuits. The
    /// result depends on `text` alone.
    pub fn classify(&self, text: &str) -> AnalysisResult {
        if text.trim().is_empty() {
            return AnalysisResult::default();
        }

        let executive_rules = Self::matching(self.rules.executive(), text);
        let adaptive_rules = Self::matching(self.rules.adaptive(), text);

        let suggestions: Vec<String> = executive_rules
            .iter()
            .filter_map(|rule| rule.suggestion())
            .map(str::to_owned)
            .collect();
        let executive_matches: Vec<DetectedPattern> =
            executive_rules.iter().map(|rule| rule.detected()).collect();
        let adaptive_matches: Vec<DetectedPattern> =
            adaptive_rules.iter().map(|rule| rule.detected()).collect();

        trace!(
            executive = executive_matches.len(),
            adaptive = adaptive_matches.len(),
            "classified prompt"
        );

        AnalysisResult {
            is_executive: !executive_matches.is_empty(),
            is_adaptive: !adaptive_matches.is_empty(),
            executive_matches,
            adaptive_matches,
            suggestions,
        }
    }

    fn matching<'rules>(rules: &'rules [Rule], text: &str) -> Vec<&'rules Rule> {
        rules.iter().filter(|rule| rule.is_match(text)).collect()
    }
}

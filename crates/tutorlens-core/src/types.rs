//! Classification vocabulary shared by the rules, classifier and pipeline.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Executive help-seeking: the user wants the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutiveKind {
    /// Asks for a complete solution
    SolutionRequest,
    /// Asks the assistant to write the code
    ImplementationRequest,
    /// Asks for the answer outright
    AnswerRequest,
    /// Pastes assignment text verbatim
    AssignmentPaste,
}

impl ExecutiveKind {
    /// Stable snake-case name used in logs and serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SolutionRequest => "solution_request",
            Self::ImplementationRequest => "implementation_request",
            Self::AnswerRequest => "answer_request",
            Self::AssignmentPaste => "assignment_paste",
        }
    }
}

impl fmt::Display for ExecutiveKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Adaptive help-seeking: the user wants hints, concepts or verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveKind {
    /// Asks for a hint or a nudge
    HintRequest,
    /// Shares an own attempt
    ShowsAttempt,
    /// Asks about an underlying concept
    ConceptualQuestion,
    /// Asks to have own work checked
    VerificationRequest,
}

impl AdaptiveKind {
    /// Stable snake-case name used in logs and serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HintRequest => "hint_request",
            Self::ShowsAttempt => "shows_attempt",
            Self::ConceptualQuestion => "conceptual_question",
            Self::VerificationRequest => "verification_request",
        }
    }
}

impl fmt::Display for AdaptiveKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The two rule lists a pattern can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Executive help-seeking
    Executive,
    /// Adaptive help-seeking
    Adaptive,
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Executive => "executive",
            Self::Adaptive => "adaptive",
        })
    }
}

/// Kind of a detected pattern, tagged by its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "kind", rename_all = "snake_case")]
pub enum PatternKind {
    /// Matched an executive rule
    Executive(ExecutiveKind),
    /// Matched an adaptive rule
    Adaptive(AdaptiveKind),
}

impl PatternKind {
    /// Category this kind belongs to.
    pub const fn category(self) -> Category {
        match self {
            Self::Executive(_) => Category::Executive,
            Self::Adaptive(_) => Category::Adaptive,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executive(kind) => fmt::Display::fmt(kind, formatter),
            Self::Adaptive(kind) => fmt::Display::fmt(kind, formatter),
        }
    }
}

/// One rule that matched a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPattern {
    /// Kind of the matching rule
    pub kind: PatternKind,
    /// Advisory message attached to the rule
    pub message: String,
}

/// Aggregated classification of a single prompt.
///
/// Both flags may be set at once; deciding which one wins is up to whoever
/// presents the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// At least one executive rule matched
    pub is_executive: bool,
    /// At least one adaptive rule matched
    pub is_adaptive: bool,
    /// Executive matches in rule order
    pub executive_matches: Vec<DetectedPattern>,
    /// Adaptive matches in rule order
    pub adaptive_matches: Vec<DetectedPattern>,
    /// Suggested replacement prompts in executive rule order
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    /// First executive match, if any.
    pub fn first_executive(&self) -> Option<&DetectedPattern> {
        self.executive_matches.first()
    }

    /// First suggested replacement prompt, if any.
    pub fn first_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }
}

//! Ordered lexical rules for executive and adaptive help-seeking.
//!
//! Patterns are compiled once with case-insensitive matching. The `regex`
//! engine runs in linear time, so long prompts cannot trigger catastrophic
//! backtracking no matter what a configured pattern looks like.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{AdaptiveKind, Category, DetectedPattern, ExecutiveKind, PatternKind};

/// Upper bound on the compiled size of a single rule.
const RULE_SIZE_LIMIT: usize = 1 << 20;

/// Inputs every rule must reject; a rule matching these would fire on anything.
const BLANK_PROBES: [&str; 2] = ["", " \t\n"];

/// Category of a rule together with the data only that category carries.
///
/// Only executive rules can offer a replacement prompt. `None` means the rule
/// has no suggested rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RuleCategory {
    /// Executive rule with an optional replacement prompt
    Executive {
        /// Kind reported when the rule matches
        kind: ExecutiveKind,
        /// Better-learning prompt to offer instead
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
    },
    /// Adaptive rule
    Adaptive {
        /// Kind reported when the rule matches
        kind: AdaptiveKind,
    },
}

impl RuleCategory {
    /// Kind reported for a match of this rule.
    pub const fn pattern_kind(&self) -> PatternKind {
        match self {
            Self::Executive { kind, .. } => PatternKind::Executive(*kind),
            Self::Adaptive { kind } => PatternKind::Adaptive(*kind),
        }
    }
}

/// Uncompiled rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regular expression, matched case-insensitively
    pub pattern: String,
    /// Message shown when the rule matches
    pub message: String,
    /// Category, kind and optional suggestion
    #[serde(flatten)]
    pub category: RuleCategory,
}

impl RuleSpec {
    /// Executive rule specification.
    pub fn executive(kind: ExecutiveKind, pattern: &str, message: &str, suggestion: &str) -> Self {
        Self {
            pattern: pattern.to_owned(),
            message: message.to_owned(),
            category: RuleCategory::Executive {
                kind,
                suggestion: Some(suggestion.to_owned()),
            },
        }
    }

    /// Adaptive rule specification.
    pub fn adaptive(kind: AdaptiveKind, pattern: &str, message: &str) -> Self {
        Self {
            pattern: pattern.to_owned(),
            message: message.to_owned(),
            category: RuleCategory::Adaptive { kind },
        }
    }
}

/// A compiled, immutable classification rule.
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: Regex,
    message: String,
    category: RuleCategory,
}

impl Rule {
    /// Compile a rule specification.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile and
    /// [`Error::BlankMatch`] if it matches blank input.
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        let kind = spec.category.pattern_kind();
        let matcher = RegexBuilder::new(&spec.pattern)
            .case_insensitive(true)
            .size_limit(RULE_SIZE_LIMIT)
            .build()
            .map_err(|source| Error::InvalidPattern {
                kind,
                pattern: spec.pattern.clone(),
                source,
            })?;

        if BLANK_PROBES.iter().any(|probe| matcher.is_match(probe)) {
            return Err(Error::BlankMatch {
                kind,
                pattern: spec.pattern.clone(),
            });
        }

        Ok(Self {
            matcher,
            message: spec.message.clone(),
            category: spec.category.clone(),
        })
    }

    /// Whether the rule matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Pattern source text.
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    /// Message shown when the rule matches.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Category of the rule.
    pub const fn category(&self) -> &RuleCategory {
        &self.category
    }

    /// Replacement prompt, present only on executive rules that define one.
    pub fn suggestion(&self) -> Option<&str> {
        match &self.category {
            RuleCategory::Executive { suggestion, .. } => suggestion.as_deref(),
            RuleCategory::Adaptive { .. } => None,
        }
    }

    /// Pattern record produced when this rule matches.
    pub fn detected(&self) -> DetectedPattern {
        DetectedPattern {
            kind: self.category.pattern_kind(),
            message: self.message.clone(),
        }
    }
}

/// The two ordered rule lists.
///
/// Declaration order is significant: it fixes the order of matches and
/// suggestions in every classification.
#[derive(Debug, Clone)]
pub struct RuleSet {
    executive: Vec<Rule>,
    adaptive: Vec<Rule>,
}

impl RuleSet {
    /// Compile specifications into a rule set, keeping relative order within
    /// each category.
    ///
    /// # Errors
    /// Returns the first compilation error encountered.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let mut executive = Vec::new();
        let mut adaptive = Vec::new();

        for spec in specs {
            let rule = Rule::compile(spec)?;
            match rule.category.pattern_kind().category() {
                Category::Executive => executive.push(rule),
                Category::Adaptive => adaptive.push(rule),
            }
        }

        Ok(Self {
            executive,
            adaptive,
        })
    }

    /// The built-in rule set.
    ///
    /// # Errors
    /// Only fails if a built-in pattern is malformed, which the tests rule out.
    pub fn builtin() -> Result<Self> {
        Self::from_specs(&builtin_specs())
    }

    /// Executive rules in declared order.
    pub fn executive(&self) -> &[Rule] {
        &self.executive
    }

    /// Adaptive rules in declared order.
    pub fn adaptive(&self) -> &[Rule] {
        &self.adaptive
    }

    /// All rules, executive first.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.executive.iter().chain(&self.adaptive)
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.executive.len() + self.adaptive.len()
    }

    /// Whether the set has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.executive.is_empty() && self.adaptive.is_empty()
    }
}

/// Specifications of the built-in rules, in evaluation order.
pub fn builtin_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec::executive(
            ExecutiveKind::SolutionRequest,
            r"\b(?:give|show|write|provide|send|tell)\s+(?:me\s+)?(?:the\s+|a\s+)?(?:full\s+|complete\s+|whole\s+|entire\s+|final\s+|working\s+)?(?:solution|answer)s?\b|\bsolve\s+(?:this|it|these|the\s+following)\b",
            "You're asking for a complete solution. Working it out yourself is where the learning happens.",
            "Can you give me a hint about how to approach this problem without showing me the full solution?",
        ),
        RuleSpec::executive(
            ExecutiveKind::ImplementationRequest,
            r"\b(?:write|code|implement|create|build|generate|make)\s+(?:me\s+)?(?:a\s+|an\s+|the\s+|this\s+|that\s+|some\s+)?(?:full\s+|complete\s+|working\s+|whole\s+)?(?:code|function|program|class|script|method|implementation|algorithm)s?\b|\b(?:give|show|send)\s+me\s+(?:the\s+)?(?:full\s+|complete\s+|working\s+|final\s+)?code\b",
            "You're asking the assistant to write the code for you.",
            "Can you explain the steps I need to implement this so I can try it myself?",
        ),
        RuleSpec::executive(
            ExecutiveKind::AnswerRequest,
            r"\bwhat(?:\s+is|['’]s)\s+the\s+(?:final\s+|correct\s+|right\s+)?answer\b|\bjust\s+(?:give|tell|show)\s+me\b|\b(?:tell|give)\s+me\s+the\s+(?:final\s+|correct\s+|right\s+)?answer\b|\banswers?\s+only\b",
            "You're asking for the answer directly.",
            "Can you check whether my reasoning is on the right track before I work out the answer myself?",
        ),
        RuleSpec::executive(
            ExecutiveKind::AssignmentPaste,
            r"\b(?:question|problem|exercise|task|part)\s+\d+[a-z]?\s*[:.)]|\(\s*\d+\s*(?:pts?|points|marks)\s*\)|\bdue\s+(?:by|on|date|tomorrow|tonight)\b|\b(?:do|complete|finish|solve)\s+my\s+(?:homework|assignment|worksheet|lab)\b",
            "This looks like a pasted assignment.",
            "Can you help me understand what this question is asking and which concepts it covers?",
        ),
        RuleSpec::adaptive(
            AdaptiveKind::HintRequest,
            r"\b(?:hints?|clues?|nudge|point\s+me\s+in\s+the\s+right\s+direction|without\s+(?:giving|telling|showing)\s+(?:me\s+)?the\s+(?:answer|solution)|where\s+(?:should|do)\s+i\s+start)\b",
            "Asking for a hint keeps you doing the thinking.",
        ),
        RuleSpec::adaptive(
            AdaptiveKind::ShowsAttempt,
            r"\b(?:i(?:['’]ve|\s+have)?\s+tried|i\s+attempted|i\s+wrote|here(?:\s+is|['’]s)\s+my|my\s+(?:code|attempt|approach|solution|answer|implementation|work|reasoning|idea))\b",
            "Sharing your own attempt first is a strong learning habit.",
        ),
        RuleSpec::adaptive(
            AdaptiveKind::ConceptualQuestion,
            r"\b(?:explain|why\s+(?:does|do|is|are|would|did)|how\s+(?:does|do)\s+\w+\s+work|what\s+(?:is|are)\s+the\s+differences?|what\s+does\s+\w+\s+mean|concept\s+(?:of|behind)|help\s+me\s+understand|intuition)\b",
            "Conceptual questions build lasting understanding.",
        ),
        RuleSpec::adaptive(
            AdaptiveKind::VerificationRequest,
            r"\b(?:is|are)\s+(?:my|this|that|it|these)\b[^.?!]{0,60}?\b(?:correct|right|valid|accurate|wrong)\b|\bam\s+i\s+(?:on\s+the\s+right\s+track|correct|right)\b|\b(?:check|verify|review)\s+(?:my|this)\b|\bdoes\s+(?:this|my\s+\w+)\s+look\s+(?:right|correct|ok|okay|good)\b",
            "Asking to verify your own work is a great way to learn.",
        ),
    ]
}

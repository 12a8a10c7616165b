//! Lexical classification of help-seeking prompts.
//!
//! This crate provides the rule set, the pure classifier that maps prompt
//! text to an [`AnalysisResult`], error handling and configuration.
#![cfg_attr(
    test,
    allow(
        clippy::missing_panics_doc,
        clippy::assertions_on_result_states,
        reason = "Allow for tests"
    )
)]

/// Pure prompt classifier.
pub mod classifier;
/// Configuration loading and defaults.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Classification rules.
pub mod rules;
/// Classification result types.
pub mod types;

pub use classifier::Classifier;
pub use config::{GateConfig, HostConfig, TutorlensConfig, UsageConfig};
pub use error::{Error, Result};
pub use rules::{Rule, RuleCategory, RuleSet, RuleSpec, builtin_specs};
pub use types::{
    AdaptiveKind, AnalysisResult, Category, DetectedPattern, ExecutiveKind, PatternKind,
};

use core::result::Result as CoreResult;
use std::io::Error as IoError;

use regex::Error as RegexError;
use thiserror::Error;
use toml::de::Error as TomlDeError;
use toml::ser::Error as TomlSerError;

use crate::types::PatternKind;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while loading configuration or building rules.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] TomlDeError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] TomlSerError),

    /// A rule pattern failed to compile.
    #[error("Invalid pattern for {kind} rule `{pattern}`: {source}")]
    InvalidPattern {
        /// Kind of the offending rule
        kind: PatternKind,
        /// Pattern source text
        pattern: String,
        /// Compilation error
        #[source]
        source: RegexError,
    },

    /// A rule pattern matches blank input and would classify every prompt.
    #[error("Pattern for {kind} rule matches blank input: `{pattern}`")]
    BlankMatch {
        /// Kind of the offending rule
        kind: PatternKind,
        /// Pattern source text
        pattern: String,
    },

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error comes from a malformed rule definition.
    ///
    /// Rule errors are programmer or configuration mistakes and are reported
    /// at start-up rather than recovered from.
    pub const fn is_rule_error(&self) -> bool {
        matches!(self, Self::InvalidPattern { .. } | Self::BlankMatch { .. })
    }
}

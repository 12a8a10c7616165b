use core::result::Result as CoreResult;
use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Result type for observation pipeline operations.
pub type Result<T> = CoreResult<T, WatchError>;

/// Errors raised outside the classification path: storage and set-up.
///
/// Nothing in the gate or trigger returns these; a failed side effect is
/// logged and the pipeline carries on.
#[derive(Debug, Error)]
pub enum WatchError {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_from_json() {
        let Err(json_error) = serde_json::from_str::<u64>("not a number") else {
            panic!("invalid json should not parse");
        };
        let error: WatchError = json_error.into();
        assert!(matches!(error, WatchError::Json(_)));
        assert!(error.to_string().starts_with("JSON error: "));
    }

    #[test]
    fn test_error_from_io() {
        let error: WatchError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(error, WatchError::Io(_)));
    }
}

//! Error types for the transfer layer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for capture, file and restore operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transfer, config or mirror-table file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Persisted file is not valid structured data or breaks a format rule
    #[error("Invalid file format: {0}")]
    Format(String),

    /// Object could not be resolved in the live scene (strict mode)
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Attribute does not exist on a live object
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// Value type incompatible with the destination attribute
    #[error("Type mismatch on {attribute}: expected {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Requested frame range has no overlap with the captured range
    #[error("Frame range {start}..{end} is outside the captured range {captured_start}..{captured_end}")]
    OutOfBounds {
        start: f64,
        end: f64,
        captured_start: f64,
        captured_end: f64,
    },

    /// Frame range with start after end
    #[error("Invalid frame range: start {start} is after end {end}")]
    InvalidRange { start: f64, end: f64 },

    /// Host scene rejected an operation
    #[error("Scene error: {0}")]
    Scene(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// True for both missing files and unresolved objects.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::ObjectNotFound(_))
    }
}

/// Result type alias for transfer operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::OutOfBounds {
            start: 5.0,
            end: 15.0,
            captured_start: 20.0,
            captured_end: 30.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("5..15"));
        assert!(msg.contains("20..30"));

        let e = Error::TypeMismatch {
            attribute: "|ctrl.visibility".into(),
            expected: "bool".into(),
            actual: "double".into(),
        };
        assert!(e.to_string().contains("|ctrl.visibility"));
    }

    #[test]
    fn test_not_found_kinds() {
        assert!(Error::FileNotFound(PathBuf::from("a.pose")).is_not_found());
        assert!(Error::ObjectNotFound("|ctrl".into()).is_not_found());
        assert!(!Error::format("bad").is_not_found());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

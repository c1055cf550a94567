//! Error types shared by the stores and the workout assembler

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Named resource is absent (routine, session document, cache entry)
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Stored document exists but cannot be parsed or lacks required fields
    #[error("malformed document {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("workout session is already saved")]
    SessionClosed,

    #[error("set {index} out of range for '{exercise}' ({len} sets)")]
    SetOutOfRange {
        exercise: String,
        index: usize,
        len: usize,
    },

    #[error("routine has no exercises")]
    NoExercises,

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("unknown exercise '{0}'")]
    UnknownExercise(String),

    #[error("invalid routine: {0}")]
    InvalidRoutine(String),

    #[error("invalid document name '{0}'")]
    InvalidName(String),
}

impl Error {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("routine", "push_day");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "routine 'push_day' not found");
    }

    #[test]
    fn test_malformed_is_not_not_found() {
        let err = Error::malformed("/tmp/x.json", "expected value");
        assert!(err.is_malformed());
        assert!(!err.is_not_found());
    }
}

//! Error taxonomy for loading, grading and exporting submissions

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the grading library
#[derive(Debug, Error)]
pub enum GradeError {
    /// No submission file matched the expected pattern
    #[error("no submission file matching `{pattern}` found in {}", dir.display())]
    NoSubmission { dir: PathBuf, pattern: String },

    /// A file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A submission record is not valid JSON or is missing required fields
    #[error("malformed submission {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The requested question id is not part of the rubric
    #[error("unknown question `{id}` (expected one of: {known})")]
    UnknownQuestion { id: String, known: String },

    /// A pattern-match rule contains an invalid regular expression
    #[error("invalid pattern `{pattern}` in question `{question}`: {source}")]
    InvalidPattern {
        question: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The rubric or configuration is inconsistent (duplicate ids, bad globs, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = GradeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_submission_message_names_pattern_and_dir() {
        let err = GradeError::NoSubmission {
            dir: PathBuf::from("/tmp/class"),
            pattern: "assignment1_*.json".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("assignment1_*.json"));
        assert!(msg.contains("/tmp/class"));
    }

    #[test]
    fn test_unknown_question_lists_known_ids() {
        let err = GradeError::UnknownQuestion {
            id: "q9".to_string(),
            known: "q1_definitions, q2_languages".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown question `q9` (expected one of: q1_definitions, q2_languages)"
        );
    }
}

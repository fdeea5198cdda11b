//! Error types for aspectlink.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the specific condition (bad configuration versus malformed input data
//! versus plain I/O failure).

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors raised before any corpus reading begins.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown context type '{value}' (expected `sent` or `para`)")]
    UnknownContextType {
        value: String,
    },

    #[error("Unknown mode '{value}' (expected `pairwise` or `pointwise`)")]
    UnknownMode {
        value: String,
    },

    #[error("Top-k must be at least 1")]
    ZeroTopK,

    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    #[error("Embedding for '{entity_id}' has {actual} dimensions, expected {expected}")]
    InvalidEmbeddingDimension {
        entity_id: String,
        actual: usize,
        expected: usize,
    },
}

/// Malformed external data. Always fatal.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{path}:{line}: run line has {found} fields, expected at least 5")]
    RunLineTooShort {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    #[error("{path}:{line}: invalid score '{value}'")]
    InvalidScore {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("{path}:{line}: description line has {found} tab-separated fields, expected 3")]
    DescriptionLineTooShort {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    #[error("{path}:{line}: malformed JSON record: {source}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: malformed embeddings file: {source}")]
    MalformedEmbeddings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error type for aspectlink.
#[derive(Debug, Error)]
pub enum AspectLinkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl AspectLinkError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a data error.
    #[must_use]
    pub const fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// Returns true if this is an I/O error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for aspectlink operations.
pub type AspectLinkResult<T> = Result<T, AspectLinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_context_type() {
        let err = ValidationError::UnknownContextType {
            value: "doc".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("'doc'"));
        assert!(msg.contains("sent"));
    }

    #[test]
    fn test_validation_error_embedding_dimension() {
        let err = ValidationError::InvalidEmbeddingDimension {
            entity_id: "enwiki:Rust".to_string(),
            actual: 3,
            expected: 2,
        };
        let msg = format!("{err}");
        assert!(msg.contains("enwiki:Rust"));
        assert!(msg.contains("3 dimensions"));
    }

    #[test]
    fn test_data_error_run_line_names_location() {
        let err = DataError::RunLineTooShort {
            path: PathBuf::from("entities.run"),
            line: 7,
            found: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains("entities.run:7"));
        assert!(msg.contains("3 fields"));
    }

    #[test]
    fn test_error_from_validation() {
        let err: AspectLinkError = ValidationError::ZeroTopK.into();
        assert!(err.is_validation());
        assert!(!err.is_data());
    }

    #[test]
    fn test_error_from_data() {
        let err: AspectLinkError = DataError::InvalidScore {
            path: PathBuf::from("x.run"),
            line: 1,
            value: "abc".to_string(),
        }
        .into();
        assert!(err.is_data());
        assert!(format!("{err}").contains("abc"));
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing corpus");
        let err: AspectLinkError = io.into();
        assert!(err.is_io());
    }

    #[test]
    fn test_error_internal() {
        let err = AspectLinkError::internal("worker disconnected");
        assert!(err.is_internal());
        assert!(format!("{err}").contains("worker disconnected"));
    }
}

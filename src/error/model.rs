// Model artifact error types and constants

use crate::error::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Model error code constants
///
/// Error code range: 2001-2005
pub struct ModelErrorCodes {}

impl ModelErrorCodes {
    /// Artifact file could not be read
    pub const IO: i32 = 2001;

    /// Artifact file is not valid JSON for the expected schema
    pub const PARSE: i32 = 2002;

    /// Artifact parsed but is internally inconsistent
    pub const INVALID_ARTIFACT: i32 = 2003;

    /// Feature vector length does not match what the artifact expects
    pub const DIMENSION_MISMATCH: i32 = 2004;

    /// Label codec has no label for a probability index
    pub const UNKNOWN_LABEL_INDEX: i32 = 2005;
}

/// Log a model error with structured context
pub fn log_model_error(err: &ModelError, context: &str) {
    tracing::error!(
        "Model error in {}: code={}, component=ModelRegistry, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while loading or evaluating classifier artifacts
///
/// The dispatcher never lets these escape `predict`: a failing artifact is
/// treated the same as a missing one and the heuristic fallback is used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid artifact: {reason}")]
    InvalidArtifact { reason: String },

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("label codec has no label for index {index}")]
    UnknownLabelIndex { index: usize },
}

impl ErrorCode for ModelError {
    fn code(&self) -> i32 {
        match self {
            ModelError::Io { .. } => ModelErrorCodes::IO,
            ModelError::Parse { .. } => ModelErrorCodes::PARSE,
            ModelError::InvalidArtifact { .. } => ModelErrorCodes::INVALID_ARTIFACT,
            ModelError::DimensionMismatch { .. } => ModelErrorCodes::DIMENSION_MISMATCH,
            ModelError::UnknownLabelIndex { .. } => ModelErrorCodes::UNKNOWN_LABEL_INDEX,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_codes() {
        let io = ModelError::Io {
            path: PathBuf::from("models/svm_model.json"),
            reason: "denied".to_string(),
        };
        assert_eq!(io.code(), ModelErrorCodes::IO);
        assert_eq!(
            ModelError::DimensionMismatch {
                expected: 17,
                actual: 16
            }
            .code(),
            ModelErrorCodes::DIMENSION_MISMATCH
        );
        assert_eq!(
            ModelError::UnknownLabelIndex { index: 7 }.code(),
            ModelErrorCodes::UNKNOWN_LABEL_INDEX
        );
    }

    #[test]
    fn test_model_error_display_includes_path() {
        let err = ModelError::Parse {
            path: PathBuf::from("models/xgb_model.json"),
            reason: "expected value".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("xgb_model.json"));
        assert!(display.contains("expected value"));
    }
}

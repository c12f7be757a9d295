//! Error types for the Repform analysis engine.

use thiserror::Error;

use crate::types::BodyPart;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No landmarks detected in frame")]
    NoLandmarksDetected,

    #[error("Pose detection failed: {0}")]
    DetectionFailed(String),

    #[error("Missing landmark: {0}")]
    MissingLandmark(BodyPart),

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Degenerate geometry: {0}")]
    Geometry(String),

    #[error("Feature shape mismatch: expected {expected}, got {actual}")]
    FeatureShapeMismatch { expected: usize, actual: usize },

    #[error("Classifier inference failed: {0}")]
    InferenceFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let missing = Error::MissingLandmark(BodyPart::LeftElbow);
        assert_eq!(missing.to_string(), "Missing landmark: LEFT_ELBOW");

        let shape = Error::FeatureShapeMismatch {
            expected: 18,
            actual: 17,
        };
        assert_eq!(
            shape.to_string(),
            "Feature shape mismatch: expected 18, got 17"
        );
    }
}

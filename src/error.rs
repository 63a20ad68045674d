//! Inference error types.

use thiserror::Error;

/// Raised when the predictor cannot score a feature row.
///
/// Shown to the user as a message; the session keeps running.
#[derive(Debug, Error)]
pub enum InferenceFailure {
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("model backend error: {0}")]
    Backend(String),

    #[error("model returned no usable output: {0}")]
    InvalidOutput(String),
}

impl From<ort::Error> for InferenceFailure {
    fn from(e: ort::Error) -> Self {
        InferenceFailure::Backend(e.to_string())
    }
}

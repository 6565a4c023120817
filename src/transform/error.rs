use thiserror::Error;

/// Per-record transform failures. Unlike source and oracle errors these
/// are not automatically fatal: the configured failure policy decides
/// whether one aborts the stream or only drops the record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    #[error("missing metadata key: {0}")]
    MissingMetadata(String),

    #[error("unknown transform step: {0}")]
    UnknownStep(String),
}

impl TransformError {
    pub fn step_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}

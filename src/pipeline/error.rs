use thiserror::Error;

use crate::filter::AccessError;
use crate::source::SourceError;
use crate::transform::TransformError;

/// Top-level pipeline errors as seen by the stream consumer.
///
/// `Source` and `AccessCheck` are fatal and surface at the point of pull;
/// `Transform` reaches the consumer only under the halt policy, otherwise
/// the failure is recorded (or discarded) per policy and the stream goes
/// on.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("access check failed: {0}")]
    AccessCheck(#[from] AccessError),

    #[error("transform failed for record '{record_id}': {source}")]
    Transform {
        record_id: String,
        source: TransformError,
    },

    #[error("unknown origin: {0}")]
    UnknownOrigin(String),

    #[error("unknown view: {0}")]
    UnknownView(String),
}

impl PipelineError {
    /// Not-found conditions are logical, everything else operational.
    pub fn is_not_found(&self) -> bool {
        match self {
            PipelineError::Source(e) => e.is_not_found(),
            PipelineError::UnknownOrigin(_) | PipelineError::UnknownView(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            PipelineError::UnknownOrigin("aviser".to_string()).to_string(),
            "unknown origin: aviser"
        );
        assert_eq!(
            PipelineError::UnknownView("marc21".to_string()).to_string(),
            "unknown view: marc21"
        );
        let err = PipelineError::Transform {
            record_id: "r3".to_string(),
            source: TransformError::step_failed("xslt", "boom"),
        };
        assert_eq!(
            err.to_string(),
            "transform failed for record 'r3': step 'xslt' failed: boom"
        );
    }

    #[test]
    fn source_error_conversion() {
        let err = PipelineError::from(SourceError::Unavailable("down".to_string()));
        assert!(matches!(err, PipelineError::Source(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn access_error_conversion() {
        let err = PipelineError::from(AccessError::Unavailable("down".to_string()));
        assert!(matches!(err, PipelineError::AccessCheck(_)));
    }

    #[test]
    fn not_found_classification() {
        assert!(PipelineError::UnknownOrigin("x".to_string()).is_not_found());
        assert!(PipelineError::from(SourceError::NotFound("id".to_string())).is_not_found());
        assert!(!PipelineError::from(AccessError::Rejected("x".to_string())).is_not_found());
    }
}

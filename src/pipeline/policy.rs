use tracing::{debug, warn};

use crate::domain::{ErrorList, ErrorRecord};
use crate::transform::TransformError;

/// Policy for handling per-record transform failures.
///
/// Chosen once per request, never mixed within one run. Returning true
/// drops the failing record and continues; returning false aborts the
/// stream, which then surfaces the failure as a fatal pipeline error.
pub trait FailurePolicy: Send + Sync {
    fn on_transform_failure(&self, record_id: &str, error: &TransformError) -> bool;
}

/// Abort the whole stream on the first transform failure. Records already
/// emitted stand; nothing after the failure is emitted.
pub struct HaltOnError;

impl FailurePolicy for HaltOnError {
    fn on_transform_failure(&self, record_id: &str, error: &TransformError) -> bool {
        warn!(record_id, %error, "transform failed, halting stream");
        false
    }
}

/// Drop the failing record, append exactly one entry to the caller's
/// error list, continue with the next record.
pub struct CollectErrors {
    errors: ErrorList,
}

impl CollectErrors {
    pub fn new(errors: ErrorList) -> Self {
        Self { errors }
    }
}

impl FailurePolicy for CollectErrors {
    fn on_transform_failure(&self, record_id: &str, error: &TransformError) -> bool {
        debug!(record_id, %error, "transform failed, collecting");
        self.errors
            .push(ErrorRecord::new(record_id, error.to_string()));
        true
    }
}

/// Drop failing records with nothing but a log line.
///
/// This is a deliberate, named mode: it is selected only when halting was
/// not requested and no error list was supplied, and the selection itself
/// is logged so failures cannot vanish unnoticed.
pub struct DiscardFailures;

impl FailurePolicy for DiscardFailures {
    fn on_transform_failure(&self, record_id: &str, error: &TransformError) -> bool {
        warn!(record_id, %error, "transform failed, record discarded");
        true
    }
}

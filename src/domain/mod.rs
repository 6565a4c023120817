pub mod metadata;
pub mod record;
pub mod report;

// Re-export commonly used types
pub use metadata::{Metadata, RECORD_ID_KEY};
pub use record::{Continuation, Record};
pub use report::{ErrorList, ErrorRecord};

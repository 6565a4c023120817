pub mod chain;
pub mod error;
pub mod registry;
pub mod step;

// Re-export commonly used types
pub use chain::View;
pub use error::TransformError;
pub use registry::StepRegistry;
pub use step::{Passthrough, TransformStep};

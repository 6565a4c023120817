pub mod config;
pub mod delivery;
pub mod error;
pub mod policy;
pub mod transformed;

// Re-export commonly used types
pub use config::DeliveryConfig;
pub use delivery::{DeliveryPipeline, DeliveryRequest, DeliveryStream};
pub use error::PipelineError;
pub use policy::{CollectErrors, DiscardFailures, FailurePolicy, HaltOnError};
pub use transformed::Transformed;

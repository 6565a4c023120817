//! Prelude module for convenient imports
//!
//! Import everything you need with: `use recflow::prelude::*;`

// Domain types
pub use crate::domain::{Continuation, ErrorList, ErrorRecord, Metadata, Record, RECORD_ID_KEY};

// Source types
pub use crate::source::{DispatchOrder, MemorySource, MultiSource, Page, PageSource, SourceError};

// Stream types
pub use crate::stream::{merge_by_key, Batched, ContinuationStream, Cursor, FanInStream};

// Filter types
pub use crate::filter::{AccessError, AccessFiltered, AccessOracle, AllowAll};

// Transform types
pub use crate::transform::{Passthrough, StepRegistry, TransformError, TransformStep, View};

// Pipeline types
pub use crate::pipeline::{
    CollectErrors, DeliveryConfig, DeliveryPipeline, DeliveryRequest, DeliveryStream,
    DiscardFailures, FailurePolicy, HaltOnError, PipelineError,
};

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::error::TransformError;
use super::step::TransformStep;
use crate::domain::{Metadata, Record};

/// A named, ordered transform chain producing one output format.
///
/// Every configured step runs for every record, strictly in order; there
/// is no branching or skipping. The chain is selected once per request by
/// output-format name, never per record. Each invocation seeds a fresh
/// metadata map with the record's id, so enrichment written by one step
/// (rights fields, holdback dates) is visible to later steps of the same
/// invocation and to nothing else.
#[derive(Clone)]
pub struct View {
    name: String,
    steps: Vec<Arc<dyn TransformStep>>,
}

impl View {
    pub fn new(name: impl Into<String>, steps: Vec<Arc<dyn TransformStep>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> usize {
        self.steps.len()
    }

    fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Run the whole chain over one record, returning the rewritten
    /// record. The first failing step aborts this invocation.
    pub async fn apply(&self, record: Record) -> Result<Record, TransformError> {
        let mut metadata = Metadata::for_record(&record);
        let Record { id, mtime, data } = record;

        let mut payload = data;
        for step in &self.steps {
            debug!(view = %self.name, step = step.id(), record = %id, "applying step");
            payload = step.apply(payload, &mut metadata).await?;
        }

        Ok(Record {
            id,
            mtime,
            data: payload,
        })
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("steps", &self.step_ids())
            .finish()
    }
}

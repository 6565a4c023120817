use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::SourceError;
use super::traits::PageSource;
use crate::domain::Record;

/// How to query the backing storages of one origin for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOrder {
    /// Try storages one at a time, in listed order; first hit wins.
    #[default]
    Sequential,
    /// Query all storages at once; first hit wins, the rest are dropped.
    Parallel,
}

/// Fan-out over the backing storages of one logical origin.
///
/// A storage answering `Ok(None)` is simply tried past; a storage error is
/// logged and likewise tried past, because a record may still exist in a
/// healthier storage. Only when every storage came up empty or broken is
/// the dispatch as a whole a not-found.
pub struct MultiSource {
    sources: Vec<Arc<dyn PageSource>>,
    order: DispatchOrder,
}

impl MultiSource {
    pub fn new(sources: Vec<Arc<dyn PageSource>>, order: DispatchOrder) -> Self {
        Self { sources, order }
    }

    /// Single-storage origin with sequential (trivial) dispatch.
    pub fn single(source: Arc<dyn PageSource>) -> Self {
        Self::new(vec![source], DispatchOrder::Sequential)
    }

    pub fn sources(&self) -> &[Arc<dyn PageSource>] {
        &self.sources
    }

    pub fn order(&self) -> DispatchOrder {
        self.order
    }

    /// Resolve one logical record across all backing storages.
    pub async fn get_record(&self, origin: &str, id: &str) -> Result<Record, SourceError> {
        match self.order {
            DispatchOrder::Sequential => self.get_sequential(origin, id).await,
            DispatchOrder::Parallel => self.get_parallel(origin, id).await,
        }
    }

    async fn get_sequential(&self, origin: &str, id: &str) -> Result<Record, SourceError> {
        for source in &self.sources {
            match source.get_record(origin, id).await {
                Ok(Some(record)) => {
                    debug!(source = source.name(), id, "record resolved");
                    return Ok(record);
                }
                Ok(None) => {
                    debug!(source = source.name(), id, "record not in source");
                }
                Err(error) => {
                    warn!(source = source.name(), id, %error, "source lookup failed");
                }
            }
        }
        Err(SourceError::NotFound(id.to_string()))
    }

    async fn get_parallel(&self, origin: &str, id: &str) -> Result<Record, SourceError> {
        let mut lookups: FuturesUnordered<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let origin = origin.to_string();
                let id = id.to_string();
                async move {
                    let name = source.name().to_string();
                    (name, source.get_record(&origin, &id).await)
                }
            })
            .collect();

        while let Some((name, result)) = lookups.next().await {
            match result {
                // First success wins; dropping `lookups` cancels the rest.
                Ok(Some(record)) => {
                    debug!(source = %name, id, "record resolved (parallel)");
                    return Ok(record);
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(source = %name, id, %error, "source lookup failed");
                }
            }
        }
        Err(SourceError::NotFound(id.to_string()))
    }
}

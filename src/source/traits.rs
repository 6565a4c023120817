use async_trait::async_trait;

use super::error::SourceError;
use crate::domain::Record;

/// One page of records from a backing storage.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Records in non-decreasing mtime order, strictly after the
    /// requested cursor.
    pub records: Vec<Record>,
    /// Cursor to pass as `after_mtime` for the next page.
    pub next_cursor: i64,
    /// True iff the storage holds records beyond this page.
    pub has_more: bool,
}

/// A remote paginated record storage.
///
/// Implementations are shared as `Arc<dyn PageSource>` across concurrent
/// pipeline runs and must be safe for that: typically a read-mostly client
/// handle created once and injected, never a lazily-built global.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Storage name, used in logs and dispatch diagnostics.
    fn name(&self) -> &str;

    /// Fetch up to `max_records` records of `origin` with mtime strictly
    /// greater than `after_mtime`, in non-decreasing mtime order.
    async fn fetch(
        &self,
        origin: &str,
        after_mtime: i64,
        max_records: u64,
    ) -> Result<Page, SourceError>;

    /// Look up one record by id. `Ok(None)` means the storage does not
    /// hold it, which is not an error for dispatch purposes.
    async fn get_record(&self, origin: &str, id: &str) -> Result<Option<Record>, SourceError>;

    /// Release any held connection. The pipeline cancels mid-flight work
    /// by dropping its fetch future and never calls this; it is for
    /// embedders that manage the storage client's lifecycle explicitly.
    async fn close(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

use async_trait::async_trait;

use super::error::SourceError;
use super::traits::{Page, PageSource};
use crate::domain::Record;

/// In-memory `PageSource` over a pre-sorted record set.
///
/// Implements the exclusive-cursor paging contract exactly, which makes it
/// the reference storage for tests and for embedders that already hold
/// their records in memory.
pub struct MemorySource {
    name: String,
    records: Vec<Record>,
}

impl MemorySource {
    /// Build a source from records; they are sorted by `(mtime, id)` so
    /// paging order is deterministic regardless of input order.
    pub fn new(name: impl Into<String>, mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| a.mtime.cmp(&b.mtime).then_with(|| a.id.cmp(&b.id)));
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PageSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        _origin: &str,
        after_mtime: i64,
        max_records: u64,
    ) -> Result<Page, SourceError> {
        let start = self.records.partition_point(|r| r.mtime <= after_mtime);
        let end = (start + max_records as usize).min(self.records.len());
        let records = self.records[start..end].to_vec();
        let next_cursor = records.last().map_or(after_mtime, |r| r.mtime);

        Ok(Page {
            records,
            next_cursor,
            has_more: end < self.records.len(),
        })
    }

    async fn get_record(&self, _origin: &str, id: &str) -> Result<Option<Record>, SourceError> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemorySource {
        MemorySource::new(
            "mem",
            vec![
                Record::new("r3", 30, "c"),
                Record::new("r1", 10, "a"),
                Record::new("r2", 20, "b"),
            ],
        )
    }

    #[tokio::test]
    async fn pages_in_mtime_order() {
        let source = source();
        let page = source.fetch("any", 0, 10).await.unwrap();
        let ids: Vec<_> = page.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r1", "r2", "r3"]);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, 30);
    }

    #[tokio::test]
    async fn cursor_is_exclusive() {
        let source = source();
        let page = source.fetch("any", 10, 10).await.unwrap();
        let ids: Vec<_> = page.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r2", "r3"]);
    }

    #[tokio::test]
    async fn reports_has_more_when_limited() {
        let source = source();
        let page = source.fetch("any", 0, 2).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.next_cursor, 20);
    }

    #[tokio::test]
    async fn empty_result_keeps_cursor() {
        let source = source();
        let page = source.fetch("any", 30, 10).await.unwrap();
        assert!(page.records.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, 30);
    }

    #[tokio::test]
    async fn get_record_finds_by_id() {
        let source = source();
        let record = source.get_record("any", "r2").await.unwrap();
        assert_eq!(record.unwrap().data, "b");
        assert!(source.get_record("any", "nope").await.unwrap().is_none());
    }
}

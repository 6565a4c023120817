use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};

use super::continuation::{ContinuationStream, Cursor};
use super::merge::{merge_by_key, MergeByKey};
use crate::domain::Record;
use crate::source::SourceError;

type MergedRecords =
    MergeByKey<ContinuationStream, Record, i64, fn(&Record) -> i64>;

fn record_mtime(record: &Record) -> i64 {
    record.mtime
}

/// Ordered listing over an origin backed by several storages.
///
/// Each storage contributes its own continuation stream; the fan-in
/// merges them by mtime and applies the request's record limit at the
/// merged level, maintaining an outer cursor with the same contract as a
/// single-storage stream.
pub struct FanInStream {
    inner: MergedRecords,
    children: Vec<Arc<Cursor>>,
    cursor: Arc<Cursor>,
    remaining: u64,
    done: bool,
}

impl FanInStream {
    /// `children` must all be built from the same `after_mtime`; each
    /// child's own limit must be at least `max_records` so any one of
    /// them could satisfy the whole window alone.
    pub fn new(children: Vec<ContinuationStream>, after_mtime: i64, max_records: u64) -> Self {
        let cursors = children.iter().map(ContinuationStream::cursor).collect();
        Self {
            inner: merge_by_key(children, record_mtime as fn(&Record) -> i64),
            children: cursors,
            cursor: Arc::new(Cursor::new(after_mtime)),
            remaining: max_records,
            done: false,
        }
    }

    pub fn cursor(&self) -> Arc<Cursor> {
        Arc::clone(&self.cursor)
    }

    fn finish(&mut self) {
        self.done = true;
        // Data remains if an exhausted child recorded more behind it, if
        // children handed the merge more records than were emitted (heads
        // parked in the heap), or if a child is still mid-stream. The last
        // check matters when the limit lands while a child has records
        // buffered or paged but no head in the heap yet; its own cursor is
        // only finalized by a further poll that never comes.
        let pulled: u64 = self.children.iter().map(|c| c.emitted()).sum();
        let has_more = self.children.iter().any(|c| c.has_more())
            || pulled > self.cursor.emitted()
            || self
                .inner
                .live_sources()
                .any(ContinuationStream::has_remaining);
        self.cursor.set_has_more(has_more);
    }
}

impl Stream for FanInStream {
    type Item = Result<Record, SourceError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        if this.remaining == 0 {
            this.finish();
            return Poll::Ready(None);
        }
        match this.inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(error))) => {
                this.done = true;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(Some(Ok(record))) => {
                this.remaining -= 1;
                this.cursor.advance(record.mtime);
                Poll::Ready(Some(Ok(record)))
            }
        }
    }
}

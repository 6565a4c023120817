use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use tracing::debug;

use crate::domain::{Continuation, Record};
use crate::source::{Page, PageSource, SourceError};

/// Shared resumption state of one delivery stream.
///
/// The stream that pulls records updates it; any handle holding the same
/// `Arc` (typically the composed pipeline output) reads it after the
/// stream is drained. The token starts at the caller-supplied mtime and
/// only ever moves forward.
#[derive(Debug)]
pub struct Cursor {
    token: AtomicI64,
    has_more: AtomicBool,
    emitted: AtomicU64,
}

impl Cursor {
    pub fn new(start_mtime: i64) -> Self {
        Self {
            token: AtomicI64::new(start_mtime),
            has_more: AtomicBool::new(false),
            emitted: AtomicU64::new(0),
        }
    }

    /// Resume-point mtime: the mtime of the last emitted record, or the
    /// starting mtime when nothing was emitted.
    pub fn token(&self) -> i64 {
        self.token.load(Ordering::Acquire)
    }

    /// True iff the source still held records when the stream stopped.
    pub fn has_more(&self) -> bool {
        self.has_more.load(Ordering::Acquire)
    }

    /// Number of records emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Acquire)
    }

    pub fn continuation(&self) -> Continuation {
        Continuation {
            token: self.token(),
            has_more: self.has_more(),
        }
    }

    pub(crate) fn advance(&self, mtime: i64) {
        // Monotonic: the token never decreases within one stream.
        self.token.fetch_max(mtime, Ordering::AcqRel);
        self.emitted.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn set_has_more(&self, has_more: bool) {
        self.has_more.store(has_more, Ordering::Release);
    }
}

/// Lazy, resumable record stream over one paginated storage.
///
/// Pages are fetched on demand, one in flight at a time, so memory stays
/// bounded by the page size no matter how large the underlying record set
/// is. A failed page fetch surfaces as `SourceError` at the point of pull
/// and ends the stream; there is no silent truncation.
///
/// Cursoring is by exclusive mtime. When many records share the boundary
/// timestamp, two calls bridging that boundary can in principle skip or
/// duplicate records; the storage interface defines no secondary sort
/// key, so this stream does not invent one.
pub struct ContinuationStream {
    source: Arc<dyn PageSource>,
    origin: String,
    next_after: i64,
    remaining: u64,
    page_size: u64,
    buffer: VecDeque<Record>,
    fetch: Option<BoxFuture<'static, Result<Page, SourceError>>>,
    fetched_any: bool,
    source_has_more: bool,
    done: bool,
    cursor: Arc<Cursor>,
}

impl ContinuationStream {
    pub fn new(
        source: Arc<dyn PageSource>,
        origin: impl Into<String>,
        after_mtime: i64,
        max_records: u64,
        page_size: u64,
    ) -> Self {
        Self {
            source,
            origin: origin.into(),
            next_after: after_mtime,
            remaining: max_records,
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            fetch: None,
            fetched_any: false,
            source_has_more: false,
            done: false,
            cursor: Arc::new(Cursor::new(after_mtime)),
        }
    }

    /// Handle to the resumption state, shared with whoever composes this
    /// stream into a larger one.
    pub fn cursor(&self) -> Arc<Cursor> {
        Arc::clone(&self.cursor)
    }

    pub fn continuation(&self) -> Continuation {
        self.cursor.continuation()
    }

    /// Cancel the stream before exhaustion. Drops the in-flight page
    /// fetch and any buffered records; a normal, non-error path.
    pub fn close(&mut self) {
        self.fetch = None;
        self.buffer.clear();
        self.done = true;
    }

    /// True while this stream, or the storage behind it, may still hold
    /// records past the current position. Exact once the stream is done;
    /// before that it reflects buffered records and the last page's
    /// `has_more` (conservatively true when nothing was fetched yet).
    pub(crate) fn has_remaining(&self) -> bool {
        if self.done {
            return self.cursor.has_more();
        }
        !self.fetched_any || !self.buffer.is_empty() || self.source_has_more
    }

    fn finish(&mut self, has_more: bool) {
        self.done = true;
        self.fetch = None;
        self.cursor.set_has_more(has_more);
    }

    fn start_fetch(&mut self) {
        let source = Arc::clone(&self.source);
        let origin = self.origin.clone();
        let after = self.next_after;
        let limit = self.page_size.min(self.remaining);
        debug!(origin = %self.origin, after, limit, "fetching page");
        self.fetch = Some(async move { source.fetch(&origin, after, limit).await }.boxed());
    }
}

impl Stream for ContinuationStream {
    type Item = Result<Record, SourceError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if this.remaining == 0 {
                let leftover = !this.buffer.is_empty();
                this.finish(this.source_has_more || leftover);
                return Poll::Ready(None);
            }

            if let Some(record) = this.buffer.pop_front() {
                this.remaining -= 1;
                this.cursor.advance(record.mtime);
                return Poll::Ready(Some(Ok(record)));
            }

            // Buffer drained: refill from the source or finish.
            if this.fetch.is_none() {
                if this.fetched_any && !this.source_has_more {
                    this.finish(false);
                    return Poll::Ready(None);
                }
                this.start_fetch();
            }

            // invariant: armed just above when absent
            let Some(fetch) = this.fetch.as_mut() else {
                unreachable!("page fetch future not armed")
            };
            match fetch.poll_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(error)) => {
                    this.done = true;
                    this.fetch = None;
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(Ok(page)) => {
                    this.fetch = None;
                    this.fetched_any = true;
                    this.source_has_more = page.has_more;
                    this.next_after = page.next_cursor;
                    this.buffer.extend(page.records);
                    if this.buffer.is_empty() && !this.source_has_more {
                        this.finish(false);
                        return Poll::Ready(None);
                    }
                }
            }
        }
    }
}

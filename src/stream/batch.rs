use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// Groups a fallible stream into fixed-size chunks.
    ///
    /// Exactly `size` elements per batch, except the final one which may
    /// be short; an empty input yields no batches at all. Order is
    /// untouched and at most one batch is buffered ahead. An upstream
    /// error is forwarded immediately and fuses the stream (fatal-abort
    /// semantics; a partially accumulated batch is discarded).
    pub struct Batched<S, T> {
        #[pin]
        inner: S,
        size: usize,
        buf: Vec<T>,
        done: bool,
    }
}

impl<S, T> Batched<S, T> {
    pub fn new(inner: S, size: usize) -> Self {
        let size = size.max(1);
        Self {
            inner,
            size,
            buf: Vec::with_capacity(size),
            done: false,
        }
    }
}

impl<S, T, E> Stream for Batched<S, T>
where
    S: Stream<Item = Result<T, E>>,
{
    type Item = Result<Vec<T>, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(item))) => {
                    this.buf.push(item);
                    if this.buf.len() == *this.size {
                        let batch = mem::replace(this.buf, Vec::with_capacity(*this.size));
                        return Poll::Ready(Some(Ok(batch)));
                    }
                }
                Poll::Ready(Some(Err(error))) => {
                    *this.done = true;
                    this.buf.clear();
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(None) => {
                    *this.done = true;
                    if this.buf.is_empty() {
                        return Poll::Ready(None);
                    }
                    let batch = mem::take(this.buf);
                    return Poll::Ready(Some(Ok(batch)));
                }
            }
        }
    }
}

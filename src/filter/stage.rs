use std::collections::{HashSet, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use pin_project_lite::pin_project;
use tracing::debug;

use super::error::AccessError;
use super::oracle::AccessOracle;
use crate::domain::Record;

pin_project! {
    /// Applies the access oracle per batch and flattens the survivors
    /// back into a record stream.
    ///
    /// One oracle call is in flight at a time (bounded look-ahead of one
    /// batch). The oracle's response order is untrusted: the stage builds
    /// a membership set and re-walks the original batch, so output order
    /// is always the batch's own order. When the oracle allows the whole
    /// batch the re-walk is skipped. An oracle failure is fatal for the
    /// stream.
    pub struct AccessFiltered<S> {
        #[pin]
        inner: S,
        oracle: Arc<dyn AccessOracle>,
        presentation_type: String,
        ready: VecDeque<Record>,
        in_flight: Option<BoxFuture<'static, Result<Vec<Record>, AccessError>>>,
        done: bool,
    }
}

impl<S> AccessFiltered<S> {
    pub fn new(
        inner: S,
        oracle: Arc<dyn AccessOracle>,
        presentation_type: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            oracle,
            presentation_type: presentation_type.into(),
            ready: VecDeque::new(),
            in_flight: None,
            done: false,
        }
    }
}

/// Check one batch and keep the allowed records in original order.
async fn filter_batch(
    oracle: Arc<dyn AccessOracle>,
    presentation_type: String,
    batch: Vec<Record>,
) -> Result<Vec<Record>, AccessError> {
    let ids: Vec<String> = batch.iter().map(|r| r.id.clone()).collect();
    let allowed = oracle.check_access(&ids, &presentation_type).await?;
    debug!(batch = batch.len(), allowed = allowed.len(), "access check");

    // Everything allowed: skip the membership re-walk.
    if allowed.len() == batch.len() {
        return Ok(batch);
    }

    let allowed: HashSet<String> = allowed.into_iter().collect();
    Ok(batch
        .into_iter()
        .filter(|record| allowed.contains(&record.id))
        .collect())
}

impl<S, E> Stream for AccessFiltered<S>
where
    S: Stream<Item = Result<Vec<Record>, E>>,
    E: From<AccessError>,
{
    type Item = Result<Record, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(record) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(record)));
            }
            if *this.done {
                return Poll::Ready(None);
            }

            if let Some(check) = this.in_flight.as_mut() {
                match check.poll_unpin(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Err(error)) => {
                        *this.done = true;
                        *this.in_flight = None;
                        return Poll::Ready(Some(Err(error.into())));
                    }
                    Poll::Ready(Ok(records)) => {
                        *this.in_flight = None;
                        this.ready.extend(records);
                        continue;
                    }
                }
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    *this.done = true;
                }
                Poll::Ready(Some(Err(error))) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(Some(Ok(batch))) => {
                    if batch.is_empty() {
                        continue;
                    }
                    *this.in_flight = Some(
                        filter_batch(
                            Arc::clone(this.oracle),
                            this.presentation_type.clone(),
                            batch,
                        )
                        .boxed(),
                    );
                }
            }
        }
    }
}

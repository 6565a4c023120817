use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use pin_project_lite::pin_project;

use super::error::PipelineError;
use super::policy::FailurePolicy;
use crate::domain::Record;
use crate::transform::{TransformError, View};

pin_project! {
    /// Applies a view's transform chain to every surviving record,
    /// mediating failures through the configured policy.
    ///
    /// One transform is in flight at a time. A policy verdict of "abort"
    /// surfaces the failure as `PipelineError::Transform` and fuses the
    /// stream; a verdict of "continue" silently skips to the next record
    /// (the policy itself is responsible for recording the failure).
    pub struct Transformed<S> {
        #[pin]
        inner: S,
        view: Arc<View>,
        policy: Arc<dyn FailurePolicy>,
        in_flight: Option<BoxFuture<'static, (String, Result<Record, TransformError>)>>,
        done: bool,
    }
}

impl<S> Transformed<S> {
    pub fn new(inner: S, view: Arc<View>, policy: Arc<dyn FailurePolicy>) -> Self {
        Self {
            inner,
            view,
            policy,
            in_flight: None,
            done: false,
        }
    }
}

impl<S> Stream for Transformed<S>
where
    S: Stream<Item = Result<Record, PipelineError>>,
{
    type Item = Result<Record, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if *this.done {
                return Poll::Ready(None);
            }

            if let Some(transform) = this.in_flight.as_mut() {
                match transform.poll_unpin(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready((_, Ok(record))) => {
                        *this.in_flight = None;
                        return Poll::Ready(Some(Ok(record)));
                    }
                    Poll::Ready((record_id, Err(error))) => {
                        *this.in_flight = None;
                        if this.policy.on_transform_failure(&record_id, &error) {
                            continue;
                        }
                        *this.done = true;
                        return Poll::Ready(Some(Err(PipelineError::Transform {
                            record_id,
                            source: error,
                        })));
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
                Poll::Ready(Some(Ok(record))) => {
                    let view = Arc::clone(this.view);
                    let record_id = record.id.clone();
                    *this.in_flight = Some(
                        async move { (record_id, view.apply(record).await) }.boxed(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::{stream, StreamExt};

    use super::*;
    use crate::domain::{ErrorList, Metadata};
    use crate::pipeline::policy::{CollectErrors, DiscardFailures, HaltOnError};
    use crate::transform::TransformStep;

    /// Fails for the record whose id matches, uppercases everyone else.
    struct FailFor(&'static str);

    #[async_trait]
    impl TransformStep for FailFor {
        fn id(&self) -> &str {
            "fail-for"
        }

        async fn apply(
            &self,
            payload: String,
            metadata: &mut Metadata,
        ) -> Result<String, TransformError> {
            if metadata.get(crate::domain::RECORD_ID_KEY) == Some(self.0) {
                return Err(TransformError::step_failed("fail-for", "poison record"));
            }
            Ok(payload.to_uppercase())
        }
    }

    fn records(n: usize) -> Vec<Result<Record, PipelineError>> {
        (1..=n)
            .map(|i| Ok(Record::new(format!("r{i}"), i as i64, format!("d{i}"))))
            .collect()
    }

    fn poisoned_view() -> Arc<View> {
        Arc::new(View::new("test", vec![Arc::new(FailFor("r3"))]))
    }

    #[tokio::test]
    async fn halt_stops_at_failing_record() {
        let mut out = Vec::new();
        let mut stream = Transformed::new(
            stream::iter(records(5)),
            poisoned_view(),
            Arc::new(HaltOnError),
        );

        let mut fatal = None;
        while let Some(result) = stream.next().await {
            match result {
                Ok(record) => out.push(record.id),
                Err(error) => {
                    fatal = Some(error);
                    break;
                }
            }
        }

        assert_eq!(out, vec!["r1", "r2"]);
        assert!(matches!(
            fatal,
            Some(PipelineError::Transform { ref record_id, .. }) if record_id == "r3"
        ));
        // Records 4 and 5 must never appear.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn collect_skips_failing_record_and_records_it() {
        let errors = ErrorList::new();
        let stream = Transformed::new(
            stream::iter(records(5)),
            poisoned_view(),
            Arc::new(CollectErrors::new(errors.clone())),
        );

        let out: Vec<String> = stream.map(|r| r.unwrap().id).collect().await;
        assert_eq!(out, vec!["r1", "r2", "r4", "r5"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.snapshot()[0].id, "r3");
    }

    #[tokio::test]
    async fn discard_skips_without_trace() {
        let stream = Transformed::new(
            stream::iter(records(5)),
            poisoned_view(),
            Arc::new(DiscardFailures),
        );

        let out: Vec<String> = stream.map(|r| r.unwrap().id).collect().await;
        assert_eq!(out, vec!["r1", "r2", "r4", "r5"]);
    }

    #[tokio::test]
    async fn transform_rewrites_payload() {
        let stream = Transformed::new(
            stream::iter(records(2)),
            poisoned_view(),
            Arc::new(HaltOnError),
        );

        let out: Vec<String> = stream.map(|r| r.unwrap().data).collect().await;
        assert_eq!(out, vec!["D1", "D2"]);
    }

    #[tokio::test]
    async fn upstream_fatal_error_passes_through() {
        let input: Vec<Result<Record, PipelineError>> = vec![
            Ok(Record::new("r1", 1, "a")),
            Err(PipelineError::UnknownOrigin("gone".to_string())),
        ];
        let mut stream = Transformed::new(
            stream::iter(input),
            poisoned_view(),
            Arc::new(DiscardFailures),
        );

        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(PipelineError::UnknownOrigin(_))
        ));
        assert!(stream.next().await.is_none());
    }
}

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tracing::{info, warn};

use super::config::DeliveryConfig;
use super::error::PipelineError;
use super::policy::{CollectErrors, DiscardFailures, FailurePolicy, HaltOnError};
use super::transformed::Transformed;
use crate::domain::{Continuation, ErrorList, Record};
use crate::filter::{AccessFiltered, AccessOracle};
use crate::source::{MultiSource, PageSource, SourceError};
use crate::stream::{Batched, ContinuationStream, Cursor, FanInStream};
use crate::transform::View;

/// One delivery call: records of `origin` modified after `after_mtime`
/// (exclusive), at most `max_records`, rendered through `view` and
/// filtered for `presentation_type`. Supplying `errors` switches
/// non-halting runs from discard to collect.
#[derive(Clone)]
pub struct DeliveryRequest {
    pub origin: String,
    pub after_mtime: i64,
    pub max_records: u64,
    pub view: String,
    pub presentation_type: String,
    pub errors: Option<ErrorList>,
}

impl DeliveryRequest {
    pub fn new(origin: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            after_mtime: 0,
            max_records: u64::MAX,
            view: view.into(),
            presentation_type: String::new(),
            errors: None,
        }
    }

    pub fn after(mut self, mtime: i64) -> Self {
        self.after_mtime = mtime;
        self
    }

    pub fn limit(mut self, max_records: u64) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn presentation(mut self, presentation_type: impl Into<String>) -> Self {
        self.presentation_type = presentation_type.into();
        self
    }

    pub fn collect_errors(mut self, errors: ErrorList) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// The assembled output stream of one delivery call.
///
/// Yields transformed, access-filtered records and carries the underlying
/// source cursor, so the caller can read the continuation token and
/// exhaustion flag once the stream is drained. The token tracks the last
/// record *pulled* from the source, not the last survivor of filtering,
/// which is what makes resumption gap-free. Dropping the stream before
/// exhaustion cancels the in-flight page fetch; that is a normal path.
pub struct DeliveryStream {
    inner: Pin<Box<dyn Stream<Item = Result<Record, PipelineError>> + Send>>,
    cursor: Arc<Cursor>,
}

impl DeliveryStream {
    pub fn token(&self) -> i64 {
        self.cursor.token()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    /// Records pulled from the source so far (not the count delivered;
    /// filtering and failure policies may have dropped some).
    pub fn pulled(&self) -> u64 {
        self.cursor.emitted()
    }

    pub fn continuation(&self) -> Continuation {
        self.cursor.continuation()
    }
}

impl Stream for DeliveryStream {
    type Item = Result<Record, PipelineError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for DeliveryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryStream")
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

/// The record-delivery pipeline: origins, views, access oracle, config.
///
/// Immutable once built, so any number of concurrent `deliver` calls may
/// share one instance; the only shared handles are the injected oracle
/// and storage clients, which are created once and passed in rather than
/// grown lazily behind a global.
pub struct DeliveryPipeline {
    origins: HashMap<String, Vec<Arc<dyn PageSource>>>,
    views: HashMap<String, Arc<View>>,
    oracle: Arc<dyn AccessOracle>,
    config: DeliveryConfig,
}

impl DeliveryPipeline {
    pub fn new(oracle: Arc<dyn AccessOracle>) -> Self {
        Self {
            origins: HashMap::new(),
            views: HashMap::new(),
            oracle,
            config: DeliveryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DeliveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an origin with its backing storages, in dispatch order.
    pub fn add_origin(
        mut self,
        name: impl Into<String>,
        sources: Vec<Arc<dyn PageSource>>,
    ) -> Self {
        self.origins.insert(name.into(), sources);
        self
    }

    /// Register an output format.
    pub fn add_view(mut self, view: View) -> Self {
        self.views.insert(view.name().to_string(), Arc::new(view));
        self
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Assemble the full pipeline for one request.
    pub fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryStream, PipelineError> {
        let sources = self
            .origins
            .get(&request.origin)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::UnknownOrigin(request.origin.clone()))?;
        let view = self
            .views
            .get(&request.view)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownView(request.view.clone()))?;

        info!(
            origin = %request.origin,
            view = %request.view,
            after = request.after_mtime,
            max = request.max_records,
            "delivering records"
        );

        let (records, cursor) = self.source_stream(sources, &request);
        let policy = self.policy_for(&request);

        let stream = records.map(|r| r.map_err(PipelineError::from));
        let stream = Batched::new(stream, self.config.batch_size);
        let stream = AccessFiltered::new(
            stream,
            Arc::clone(&self.oracle),
            request.presentation_type,
        );
        let stream = Transformed::new(stream, view, policy);

        Ok(DeliveryStream {
            inner: Box::pin(stream),
            cursor,
        })
    }

    /// Resolve one logical record across the origin's backing storages,
    /// sequentially or in parallel per configuration.
    pub async fn fetch_record(&self, origin: &str, id: &str) -> Result<Record, PipelineError> {
        let sources = self
            .origins
            .get(origin)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::UnknownOrigin(origin.to_string()))?;

        let dispatch = MultiSource::new(sources.clone(), self.config.order);
        Ok(dispatch.get_record(origin, id).await?)
    }

    fn source_stream(
        &self,
        sources: &[Arc<dyn PageSource>],
        request: &DeliveryRequest,
    ) -> (
        Pin<Box<dyn Stream<Item = Result<Record, SourceError>> + Send>>,
        Arc<Cursor>,
    ) {
        let page_size = self.config.batch_size as u64;

        if let [source] = sources {
            let stream = ContinuationStream::new(
                Arc::clone(source),
                &request.origin,
                request.after_mtime,
                request.max_records,
                page_size,
            );
            let cursor = stream.cursor();
            return (stream.boxed(), cursor);
        }

        // Multi-storage origin: every child can satisfy the whole window;
        // the fan-in applies the limit at the merged level.
        let children = sources
            .iter()
            .map(|source| {
                ContinuationStream::new(
                    Arc::clone(source),
                    &request.origin,
                    request.after_mtime,
                    request.max_records,
                    page_size,
                )
            })
            .collect();
        let fan = FanInStream::new(children, request.after_mtime, request.max_records);
        let cursor = fan.cursor();
        (fan.boxed(), cursor)
    }

    fn policy_for(&self, request: &DeliveryRequest) -> Arc<dyn FailurePolicy> {
        if self.config.stop_on_error {
            return Arc::new(HaltOnError);
        }
        match &request.errors {
            Some(errors) => Arc::new(CollectErrors::new(errors.clone())),
            None => {
                warn!(
                    origin = %request.origin,
                    "no error list supplied, transform failures will be discarded"
                );
                Arc::new(DiscardFailures)
            }
        }
    }
}

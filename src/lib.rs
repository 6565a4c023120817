//! Streaming, continuation-resumable record delivery.
//!
//! `recflow` turns an unbounded, time-ordered record set held in one or
//! more remote storages into an access-filtered, transformed output
//! stream that a caller can page through with a continuation token:
//!
//! 1. [`stream::ContinuationStream`] pulls pages from a
//!    [`source::PageSource`] on demand and tracks the resume cursor;
//! 2. [`stream::Batched`] groups records so the access oracle can be
//!    asked once per batch instead of once per record;
//! 3. [`filter::AccessFiltered`] keeps only the records the caller may
//!    see, in their original order;
//! 4. [`transform::View`] runs the configured transform chain per
//!    record, with failures handled by the request's
//!    [`pipeline::FailurePolicy`].
//!
//! [`pipeline::DeliveryPipeline`] wires the stages together. Everything
//! is pull-based: each stage suspends exactly where it needs more input,
//! so memory stays bounded by the batch size regardless of corpus size.

pub mod domain;
pub mod filter;
pub mod pipeline;
pub mod prelude;
pub mod source;
pub mod stream;
pub mod transform;

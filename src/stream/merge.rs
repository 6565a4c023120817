use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};

/// K-way ordered merge of pre-sorted fallible streams.
///
/// Each source must already yield elements in non-decreasing key order;
/// the merge interleaves them into one fully ordered stream. A min-heap
/// over the current head of every live source gives O(log N) work per
/// emitted element. Equal keys are broken deterministically by source
/// index (lower index first).
///
/// A source error is fatal for the whole merge and forwarded immediately;
/// there is no partial best-effort merging. Zero sources is an empty
/// stream.
pub struct MergeByKey<S, T, K, F> {
    sources: Vec<Option<S>>,
    heads: Vec<Option<T>>,
    heap: BinaryHeap<Reverse<(K, usize)>>,
    // Sources whose head must be (re)filled before the next emit.
    refill: Vec<usize>,
    key: F,
    failed: bool,
}

impl<S, T, K, F> MergeByKey<S, T, K, F> {
    /// Sources the merge has not yet exhausted.
    pub(crate) fn live_sources(&self) -> impl Iterator<Item = &S> {
        self.sources.iter().flatten()
    }
}

/// Merge `sources` ordered by `key`. See [`MergeByKey`].
pub fn merge_by_key<S, T, E, K, F>(sources: Vec<S>, key: F) -> MergeByKey<S, T, K, F>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    K: Ord,
    F: Fn(&T) -> K,
{
    let n = sources.len();
    MergeByKey {
        sources: sources.into_iter().map(Some).collect(),
        heads: (0..n).map(|_| None).collect(),
        heap: BinaryHeap::with_capacity(n),
        refill: (0..n).rev().collect(),
        key,
        failed: false,
    }
}

impl<S, T, E, K, F> Stream for MergeByKey<S, T, K, F>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    T: Unpin,
    K: Ord + Unpin,
    F: Fn(&T) -> K + Unpin,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.failed {
            return Poll::Ready(None);
        }

        // Every source on the refill list must produce a head (or end)
        // before a winner can be chosen.
        while let Some(&idx) = this.refill.last() {
            let Some(source) = this.sources[idx].as_mut() else {
                this.refill.pop();
                continue;
            };
            match source.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    this.sources[idx] = None;
                    this.refill.pop();
                }
                Poll::Ready(Some(Err(error))) => {
                    this.failed = true;
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(Some(Ok(item))) => {
                    this.heap.push(Reverse(((this.key)(&item), idx)));
                    this.heads[idx] = Some(item);
                    this.refill.pop();
                }
            }
        }

        match this.heap.pop() {
            None => Poll::Ready(None),
            Some(Reverse((_, idx))) => {
                let item = this.heads[idx]
                    .take()
                    .unwrap_or_else(|| unreachable!("head missing for heap entry"));
                this.refill.push(idx);
                Poll::Ready(Some(Ok(item)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    type IntResult = Result<i64, &'static str>;

    fn ints(values: Vec<i64>) -> stream::Iter<std::vec::IntoIter<IntResult>> {
        stream::iter(values.into_iter().map(Ok).collect::<Vec<_>>().into_iter())
    }

    async fn merged(sources: Vec<Vec<i64>>) -> Vec<i64> {
        let streams: Vec<_> = sources.into_iter().map(ints).collect();
        merge_by_key(streams, |v| *v)
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn interleaves_in_order() {
        let out = merged(vec![vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]]).await;
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn zero_sources_is_empty() {
        let out = merged(vec![]).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn empty_sources_are_dropped() {
        let out = merged(vec![vec![], vec![5, 6], vec![]]).await;
        assert_eq!(out, vec![5, 6]);
    }

    #[tokio::test]
    async fn duplicate_keys_across_sources() {
        let out = merged(vec![vec![1, 3, 3], vec![3, 4]]).await;
        assert_eq!(out, vec![1, 3, 3, 3, 4]);
    }

    #[tokio::test]
    async fn ties_break_by_source_index() {
        let a = stream::iter(vec![Ok::<_, &str>(("a", 1))]);
        let b = stream::iter(vec![Ok::<_, &str>(("b", 1))]);
        let out: Vec<_> = merge_by_key(vec![a, b], |(_, k)| *k)
            .map(|r| r.unwrap().0)
            .collect()
            .await;
        assert_eq!(out, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn source_error_is_fatal() {
        let good = stream::iter(vec![Ok(1), Ok(10)]);
        let bad = stream::iter(vec![Ok(2), Err("advance failed"), Ok(4)]);
        let mut merge = merge_by_key(vec![good, bad], |v: &i64| *v);

        assert_eq!(merge.next().await.unwrap().unwrap(), 1);
        assert_eq!(merge.next().await.unwrap().unwrap(), 2);
        // Refilling the failed source surfaces the error and fuses.
        assert_eq!(merge.next().await.unwrap().unwrap_err(), "advance failed");
        assert!(merge.next().await.is_none());
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn merge_equals_sorted_concat(
                sources in prop::collection::vec(
                    prop::collection::vec(-1000i64..1000, 0..30),
                    0..6,
                )
            ) {
                let sorted_sources: Vec<Vec<i64>> = sources
                    .into_iter()
                    .map(|mut s| { s.sort_unstable(); s })
                    .collect();

                let mut expected: Vec<i64> =
                    sorted_sources.iter().flatten().copied().collect();
                expected.sort_unstable();

                let out = futures::executor::block_on(merged(sorted_sources));
                prop_assert_eq!(out, expected);
            }
        }
    }
}

use async_trait::async_trait;

use super::error::AccessError;

/// Remote policy engine deciding which record ids the caller may see.
///
/// `check_access` must be idempotent and side-effect-free: the pipeline
/// calls it once per batch and may be retried wholesale by an outer
/// layer. The returned subset's order is untrusted. Implementations are
/// shared as `Arc<dyn AccessOracle>` by concurrent pipeline runs.
#[async_trait]
pub trait AccessOracle: Send + Sync {
    /// Return the subset of `ids` the caller is allowed to see for the
    /// given presentation type.
    async fn check_access(
        &self,
        ids: &[String],
        presentation_type: &str,
    ) -> Result<Vec<String>, AccessError>;
}

/// The explicit allow-everything oracle. Used when filtering is switched
/// off by configuration; never an implicit fallback on oracle failure.
pub struct AllowAll;

#[async_trait]
impl AccessOracle for AllowAll {
    async fn check_access(
        &self,
        ids: &[String],
        _presentation_type: &str,
    ) -> Result<Vec<String>, AccessError> {
        Ok(ids.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allow_all_returns_every_id() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let allowed = AllowAll.check_access(&ids, "thumbnail").await.unwrap();
        assert_eq!(allowed, ids);
    }
}

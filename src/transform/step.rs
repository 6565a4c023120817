use async_trait::async_trait;

use super::error::TransformError;
use crate::domain::Metadata;

/// One content transformation, pluggable by name.
///
/// A step receives the current payload and the record's metadata map; it
/// returns the new payload and may read or write metadata for steps later
/// in the same chain. Steps are free to perform I/O (for example looking
/// up a sub-record), which is why `apply` is async. Implementations must
/// be stateless across records.
#[async_trait]
pub trait TransformStep: Send + Sync {
    /// Registry name of this step.
    fn id(&self) -> &str;

    async fn apply(
        &self,
        payload: String,
        metadata: &mut Metadata,
    ) -> Result<String, TransformError>;
}

/// Identity step: payload and metadata pass through untouched.
pub struct Passthrough;

#[async_trait]
impl TransformStep for Passthrough {
    fn id(&self) -> &str {
        "passthrough"
    }

    async fn apply(
        &self,
        payload: String,
        _metadata: &mut Metadata,
    ) -> Result<String, TransformError> {
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_returns_payload_unchanged() {
        let mut metadata = Metadata::new();
        let out = Passthrough
            .apply("<record/>".to_string(), &mut metadata)
            .await
            .unwrap();
        assert_eq!(out, "<record/>");
        assert!(metadata.is_empty());
    }
}

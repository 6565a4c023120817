use serde::Deserialize;

use crate::source::DispatchOrder;

fn default_batch_size() -> usize {
    500
}

fn default_stop_on_error() -> bool {
    true
}

/// Options recognized by the delivery core. The surrounding service loads
/// these from its own configuration format; any omitted field takes its
/// documented default.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Records per access-oracle call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Halt the whole stream on the first transform failure. When false,
    /// failures are collected into the request's `ErrorList`, or
    /// discarded (logged only) when none is supplied.
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,

    /// How `fetch_record` queries the backing storages of an origin.
    #[serde(default)]
    pub order: DispatchOrder,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            stop_on_error: default_stop_on_error(),
            order: DispatchOrder::Sequential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = DeliveryConfig::default();
        assert_eq!(config.batch_size, 500);
        assert!(config.stop_on_error);
        assert_eq!(config.order, DispatchOrder::Sequential);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: DeliveryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch_size, 500);
        assert!(config.stop_on_error);
        assert_eq!(config.order, DispatchOrder::Sequential);
    }

    #[test]
    fn fields_override_defaults() {
        let config: DeliveryConfig = serde_json::from_str(
            r#"{"batch_size": 50, "stop_on_error": false, "order": "parallel"}"#,
        )
        .unwrap();
        assert_eq!(config.batch_size, 50);
        assert!(!config.stop_on_error);
        assert_eq!(config.order, DispatchOrder::Parallel);
    }
}

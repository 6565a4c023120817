use std::collections::HashMap;
use std::sync::Arc;

use super::chain::View;
use super::error::TransformError;
use super::step::TransformStep;

/// Explicit name-to-step table.
///
/// Steps are registered once at process start from a hard list (or a
/// compiled-in plugin table); views are then assembled from configured
/// step names. This replaces runtime classpath scanning with a lookup
/// that fails loudly at configuration time instead of at first use.
#[derive(Default)]
pub struct StepRegistry {
    steps: HashMap<String, Arc<dyn TransformStep>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step under its own id, replacing any previous entry
    /// with the same id.
    pub fn register(&mut self, step: Arc<dyn TransformStep>) {
        self.steps.insert(step.id().to_string(), step);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn TransformStep>> {
        self.steps.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Assemble a view from configured step names, in the given order.
    pub fn view(&self, name: impl Into<String>, step_ids: &[&str]) -> Result<View, TransformError> {
        let steps = step_ids
            .iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| TransformError::UnknownStep((*id).to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(View::new(name, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::step::Passthrough;

    #[test]
    fn registers_and_resolves_steps() {
        let mut registry = StepRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Passthrough));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("passthrough").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn builds_view_from_step_names() {
        let mut registry = StepRegistry::new();
        registry.register(Arc::new(Passthrough));

        let view = registry
            .view("raw", &["passthrough", "passthrough"])
            .unwrap();
        assert_eq!(view.name(), "raw");
        assert_eq!(view.steps(), 2);
    }

    #[test]
    fn unknown_step_fails_at_assembly() {
        let registry = StepRegistry::new();
        let err = registry.view("v", &["xslt-marc"]).unwrap_err();
        assert_eq!(err, TransformError::UnknownStep("xslt-marc".to_string()));
    }
}

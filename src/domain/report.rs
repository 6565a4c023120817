use std::sync::{Arc, Mutex};

use serde::Serialize;

/// One per-record transform failure, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub id: String,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Append-only collection of transform failures for one request.
///
/// Cheap to clone: the caller keeps one handle and hands another to the
/// pipeline, then inspects the list after draining the stream.
#[derive(Debug, Clone, Default)]
pub struct ErrorList(Arc<Mutex<Vec<ErrorRecord>>>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: ErrorRecord) {
        self.0
            .lock()
            .expect("error list lock poisoned")
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.0.lock().expect("error list lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the collected errors, in append order.
    pub fn snapshot(&self) -> Vec<ErrorRecord> {
        self.0.lock().expect("error list lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let list = ErrorList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.snapshot().is_empty());
    }

    #[test]
    fn preserves_append_order() {
        let list = ErrorList::new();
        list.push(ErrorRecord::new("a", "first"));
        list.push(ErrorRecord::new("b", "second"));

        let snapshot = list.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, "a");
        assert_eq!(snapshot[1].id, "b");
    }

    #[test]
    fn clones_share_the_same_list() {
        let list = ErrorList::new();
        let handle = list.clone();
        handle.push(ErrorRecord::new("x", "boom"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.snapshot()[0].message, "boom");
    }
}

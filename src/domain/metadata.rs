use std::collections::HashMap;

use super::record::Record;

/// Key under which every record's own id is seeded into its metadata.
pub const RECORD_ID_KEY: &str = "recordID";

/// Per-record scratch map shared by all steps of one chain invocation.
///
/// Created fresh for each record, seeded with the record's id, and passed
/// `&mut` through the whole transform chain. Earlier steps may write keys
/// (rights fields, holdback dates) that later steps in the same chain
/// read; nothing leaks across records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(HashMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata seeded for one record: `{"recordID": <id>}`.
    pub fn for_record(record: &Record) -> Self {
        let mut map = HashMap::new();
        map.insert(RECORD_ID_KEY.to_string(), record.id.clone());
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert or overwrite a key, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

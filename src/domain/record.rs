use serde::{Deserialize, Serialize};

/// A single metadata record as delivered by a backing storage.
///
/// `id` is unique within an origin. `mtime` (epoch microseconds) is
/// non-decreasing in delivery order but not unique: several records may
/// carry the same timestamp. `data` is the payload that transform steps
/// read and replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub mtime: i64,
    pub data: String,
}

impl Record {
    pub fn new(id: impl Into<String>, mtime: i64, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mtime,
            data: data.into(),
        }
    }
}

/// Resumption state of a delivery stream.
///
/// `token` is the mtime to pass as `after_mtime` on the next call
/// (exclusive). When no record was emitted it equals the caller-supplied
/// starting mtime, so resuming is always well-defined. `has_more` is true
/// iff the source still had records when the limit was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    pub token: i64,
    pub has_more: bool,
}

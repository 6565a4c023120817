pub mod batch;
pub mod continuation;
pub mod fanin;
pub mod merge;

// Re-export commonly used types
pub use batch::Batched;
pub use continuation::{ContinuationStream, Cursor};
pub use fanin::FanInStream;
pub use merge::{merge_by_key, MergeByKey};

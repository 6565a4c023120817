pub mod error;
pub mod memory;
pub mod multi;
pub mod traits;

// Re-export commonly used types
pub use error::SourceError;
pub use memory::MemorySource;
pub use multi::{DispatchOrder, MultiSource};
pub use traits::{Page, PageSource};

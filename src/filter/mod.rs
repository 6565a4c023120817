pub mod error;
pub mod oracle;
pub mod stage;

// Re-export commonly used types
pub use error::AccessError;
pub use oracle::{AccessOracle, AllowAll};
pub use stage::AccessFiltered;

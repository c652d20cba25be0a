//! console-core: Shared infrastructure for the admin console client crates.
pub mod error;
pub mod observability;

pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;

//! Data models
//!
//! Shared between the JSON-RPC client and the scan pipeline.
//! All IDs are `i64`, matching the server's integer record ids.

pub mod catalog;
pub mod product;
pub mod serde_helpers;
pub mod variant;

// Re-exports
pub use catalog::*;
pub use product::*;
pub use variant::*;

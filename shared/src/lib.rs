//! Shared types for the variant-scan workspace
//!
//! Domain and wire types used by both the JSON-RPC client and the scan
//! pipeline: product records, variant candidates, lookup results, the
//! JSON-RPC envelope and the unified error codes.

pub mod error;
pub mod lookup;
pub mod models;
pub mod rpc;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorCode};
pub use lookup::LookupResult;
pub use models::{CatalogSnapshot, Product, ProductId, ProductTemplate, TemplateId, TemplateRef, VariantCandidate};

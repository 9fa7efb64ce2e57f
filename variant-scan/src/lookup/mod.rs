//! Barcode lookup - remote call and payload classification

pub mod remote;
pub mod resolver;

pub use remote::{CatalogRpc, VariantRemoteLookup, fetch_product};
pub use resolver::VariantResolver;

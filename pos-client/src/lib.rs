//! POS Client - JSON-RPC client for the POS server
//!
//! Provides the remote calls the scan pipeline depends on: barcode lookup,
//! product read by id and the bulk catalog load.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::rpc::{RpcErrorObject, RpcRequest, RpcResponse};
pub use shared::{CatalogSnapshot, Product, ProductId};

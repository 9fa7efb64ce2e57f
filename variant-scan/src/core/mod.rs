//! Core module - configuration and error definitions
//!
//! - [`Config`] - scan station configuration
//! - [`ScanError`] - scan pipeline errors

pub mod config;
pub mod error;

pub use config::Config;
pub use error::ScanError;

/// Result type alias for the scan pipeline
pub type ScanResult<T> = std::result::Result<T, ScanError>;

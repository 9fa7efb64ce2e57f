//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 4xxx: Order ====================
    /// No order is open to receive the product
    OrderNotFound = 4001,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Barcode matched no product
    BarcodeNotFound = 6004,
    /// Barcode already used by a product of another template
    BarcodeDuplicate = 6005,
    /// Selected variant could not be fetched
    VariantFetchFailed = 6006,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network unreachable
    NetworkError = 9003,
    /// Request timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Remote answered with a malformed payload
    InvalidResponse = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",

            // Order
            ErrorCode::OrderNotFound => "No open order",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::BarcodeNotFound => "The barcode could not be found",
            ErrorCode::BarcodeDuplicate => {
                "Barcode is already used by a product that is not a variant of the same template"
            }
            ErrorCode::VariantFetchFailed => "The selected variant could not be loaded",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Request timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::InvalidResponse => "Invalid response from server",
        }
    }
}

/// Returned when a numeric value does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6004 => Ok(ErrorCode::BarcodeNotFound),
            6005 => Ok(ErrorCode::BarcodeDuplicate),
            6006 => Ok(ErrorCode::VariantFetchFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::InvalidResponse),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

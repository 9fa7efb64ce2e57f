use pos_client::ClientError;
use shared::{ErrorCode, ProductId};
use thiserror::Error;

use crate::operator::ErrorPopup;

/// Errors raised while resolving a scan
///
/// None of these escape `ScanDispatcher::on_scan`; each is turned into at
/// most one operator popup and a [`ScanOutcome`](crate::dispatch::ScanOutcome).
#[derive(Error, Debug)]
pub enum ScanError {
    /// Barcode lookup call unreachable or answered with malformed data
    ///
    /// Only reported when the local fallback finds nothing either.
    #[error("Barcode lookup failed for {barcode}: {source}")]
    Network {
        barcode: String,
        #[source]
        source: ClientError,
    },

    /// Fetch-by-id of a selected variant failed
    #[error("Failed to fetch product {product_id}: {source}")]
    Fetch {
        product_id: ProductId,
        #[source]
        source: ClientError,
    },

    /// Neither the server nor the local cache knows the barcode
    #[error("Barcode not found: {barcode}")]
    NotFound { barcode: String },

    /// The order refused the product
    #[error("Order rejected product {product_id}: {reason}")]
    Order { product_id: ProductId, reason: String },

    /// Bulk catalog load failed
    #[error("Failed to load catalog: {0}")]
    CatalogLoad(#[source] ClientError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScanError {
    /// Unified error code
    pub fn code(&self) -> ErrorCode {
        match self {
            ScanError::Network { source, .. } => source.code(),
            ScanError::Fetch { .. } => ErrorCode::VariantFetchFailed,
            ScanError::NotFound { .. } => ErrorCode::BarcodeNotFound,
            ScanError::Order { .. } => ErrorCode::OrderNotFound,
            ScanError::CatalogLoad(source) => source.code(),
            ScanError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Operator-facing popup for this error
    pub fn popup(&self) -> ErrorPopup {
        match self {
            ScanError::Network { barcode, .. } => ErrorPopup::new(
                "Connection Error",
                format!(
                    "The barcode {barcode} was not found in the local catalog and the server could not confirm it ({}).",
                    self.code().message()
                ),
            ),
            ScanError::Fetch { product_id, .. } => ErrorPopup::new(
                "Variant Unavailable",
                format!("The selected variant (#{product_id}) could not be loaded. Nothing was added to the order."),
            ),
            ScanError::NotFound { barcode } => ErrorPopup::new(
                "Invalid Barcode",
                format!("The barcode {barcode} could not be found."),
            ),
            ScanError::Order { reason, .. } => ErrorPopup::new("Unable to Add Product", reason.clone()),
            ScanError::CatalogLoad(_) => ErrorPopup::new(
                "Catalog Unavailable",
                "The product catalog could not be loaded. Only server lookups are available.",
            ),
            ScanError::Config(message) => ErrorPopup::new("Configuration Error", message.clone()),
        }
    }
}

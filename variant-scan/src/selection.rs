//! Variant selection flow
//!
//! Presents the candidates sharing a barcode and resolves the operator's
//! choice to a full product record, from the cache when possible.

use std::sync::Arc;

use shared::{Product, VariantCandidate};

use crate::catalog::ProductCache;
use crate::core::ScanResult;
use crate::lookup::{CatalogRpc, fetch_product};
use crate::operator::{OperatorPrompt, SelectionPopup};

/// Operator's answer to a selection popup
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Product(Product),
    Cancelled,
}

/// Stateless between invocations
#[derive(Clone)]
pub struct VariantSelectionFlow {
    rpc: Arc<dyn CatalogRpc>,
    operator: Arc<dyn OperatorPrompt>,
}

impl VariantSelectionFlow {
    pub fn new(rpc: Arc<dyn CatalogRpc>, operator: Arc<dyn OperatorPrompt>) -> Self {
        Self { rpc, operator }
    }

    /// Popup listing `candidates` in order
    pub fn popup(barcode: &str, candidates: &[VariantCandidate]) -> SelectionPopup {
        SelectionPopup {
            title: "Select Variant".to_string(),
            body: format!(
                "Multiple variants were found with barcode {barcode}. Please select the correct variant."
            ),
            items: candidates.iter().map(VariantCandidate::label).collect(),
            confirm_text: "Add".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }

    /// Let the operator pick one candidate
    ///
    /// A cached candidate is returned without a network call. Otherwise it
    /// is fetched once by id and inserted into the cache. A failed fetch is
    /// [`ScanError::Fetch`](crate::core::ScanError::Fetch).
    pub async fn resolve(
        &self,
        barcode: &str,
        candidates: &[VariantCandidate],
        cache: &dyn ProductCache,
    ) -> ScanResult<Selection> {
        let Some(index) = self.operator.select(Self::popup(barcode, candidates)).await else {
            tracing::debug!(barcode = %barcode, "Variant selection cancelled");
            return Ok(Selection::Cancelled);
        };
        let Some(candidate) = candidates.get(index) else {
            tracing::warn!(barcode = %barcode, index, "Selection index out of range, treating as cancel");
            return Ok(Selection::Cancelled);
        };

        if let Some(product) = cache.get(candidate.id) {
            tracing::debug!(product_id = candidate.id, "Selected variant served from cache");
            return Ok(Selection::Product(product));
        }

        let product = fetch_product(self.rpc.as_ref(), cache, candidate.id).await?;
        Ok(Selection::Product(product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_labels() {
        let popup = VariantSelectionFlow::popup(
            "5099999",
            &[
                VariantCandidate::new(1, "Shirt", ["Red", "S"]),
                VariantCandidate::new(2, "Shirt", Vec::<String>::new()),
            ],
        );
        assert_eq!(popup.title, "Select Variant");
        assert!(popup.body.contains("5099999"));
        assert_eq!(popup.items, vec!["Shirt (Red, S)", "Shirt"]);
        assert_eq!(popup.cancel_text, "Cancel");
    }
}

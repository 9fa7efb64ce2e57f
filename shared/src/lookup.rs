//! Barcode lookup result and its wire payloads
//!
//! The server answers a barcode lookup with one of:
//!
//! ```json
//! null
//! {"id": 42, "name": "Widget", "barcode": "5012345", "product_tmpl_id": [7, "Widget"]}
//! {"multiple_variants": true, "product_tmpl_id": [9, "Shirt"],
//!  "variants": [{"id": 1, "name": "Shirt", "combination_name": ["Red", "S"]}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::models::serde_helpers;
use crate::models::{Product, TemplateRef, VariantCandidate};

/// Variant-shaped lookup payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantsPayload {
    #[serde(default)]
    pub multiple_variants: bool,
    #[serde(default, with = "serde_helpers::many2one")]
    pub product_tmpl_id: Option<TemplateRef>,
    pub variants: Vec<VariantCandidate>,
}

impl VariantsPayload {
    pub fn new(template: Option<TemplateRef>, variants: Vec<VariantCandidate>) -> Self {
        Self {
            multiple_variants: variants.len() > 1,
            product_tmpl_id: template,
            variants,
        }
    }
}

/// Outcome of resolving one scanned barcode
///
/// `MultipleVariants` always carries at least two candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    NotFound,
    SingleProduct(Product),
    MultipleVariants {
        template: Option<TemplateRef>,
        candidates: Vec<VariantCandidate>,
    },
}

impl LookupResult {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupResult::NotFound)
    }

    /// Number of purchasable products this result stands for
    pub fn match_count(&self) -> usize {
        match self {
            LookupResult::NotFound => 0,
            LookupResult::SingleProduct(_) => 1,
            LookupResult::MultipleVariants { candidates, .. } => candidates.len(),
        }
    }

    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            LookupResult::NotFound => "not_found",
            LookupResult::SingleProduct(_) => "single_product",
            LookupResult::MultipleVariants { .. } => "multiple_variants",
        }
    }
}

//! Catalog snapshot loaded at session start

use serde::{Deserialize, Serialize};

use super::product::{Product, ProductTemplate};

/// Everything the POS loads in bulk when a session opens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub templates: Vec<ProductTemplate>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>, templates: Vec<ProductTemplate>) -> Self {
        Self {
            products,
            templates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.templates.is_empty()
    }
}

//! Variant candidate offered to the operator

use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};
use super::serde_helpers;

/// One variant of a template, as returned by the barcode lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCandidate {
    pub id: ProductId,
    pub name: String,
    /// Attribute values (e.g. "Red", "S"), in display order
    #[serde(
        default,
        rename = "combination_name",
        deserialize_with = "serde_helpers::string_or_seq"
    )]
    pub attribute_values: Vec<String>,
}

impl VariantCandidate {
    pub fn new<I, S>(id: ProductId, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            attribute_values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Text shown in the selection list: `Shirt (Red, S)`, or just the name
    /// when there are no attribute values
    pub fn label(&self) -> String {
        if self.attribute_values.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.attribute_values.join(", "))
        }
    }
}

impl From<&Product> for VariantCandidate {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            attribute_values: product.attribute_values.clone(),
        }
    }
}

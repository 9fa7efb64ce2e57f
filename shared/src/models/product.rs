//! Product Model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::serde_helpers::{self, TemplateRefRepr};

/// Product (variant) identifier
pub type ProductId = i64;

/// Product template identifier
pub type TemplateId = i64;

/// Reference to the template owning a product variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TemplateRefRepr", into = "TemplateRefRepr")]
pub struct TemplateRef {
    pub id: TemplateId,
    pub name: Option<String>,
}

impl TemplateRef {
    pub fn new(id: TemplateId) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: TemplateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// Product entity (one purchasable variant)
///
/// Pricing and display fields are not interpreted here; they are kept in
/// `extra` and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::optional_text")]
    pub barcode: Option<String>,
    /// Owning template (unset until enriched)
    #[serde(default, with = "serde_helpers::many2one")]
    pub product_tmpl_id: Option<TemplateRef>,
    /// Attribute values of this variant, in display order
    #[serde(
        default,
        rename = "combination_name",
        deserialize_with = "serde_helpers::string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attribute_values: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            barcode: None,
            product_tmpl_id: None,
            attribute_values: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_template(mut self, template: TemplateRef) -> Self {
        self.product_tmpl_id = Some(template);
        self
    }

    pub fn with_attribute_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Template id, if the record has been enriched
    pub fn template_id(&self) -> Option<TemplateId> {
        self.product_tmpl_id.as_ref().map(|t| t.id)
    }

    /// Whether the raw barcode equals `code`
    pub fn has_barcode(&self, code: &str) -> bool {
        self.barcode.as_deref() == Some(code)
    }
}

/// Product template entity
///
/// Groups the variants of one conceptual product. When `use_shared_barcode`
/// is set, every variant carries `shared_barcode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::optional_text")]
    pub shared_barcode: Option<String>,
    #[serde(default)]
    pub use_shared_barcode: bool,
    /// Variant ids, in creation order
    #[serde(default, rename = "product_variant_ids")]
    pub variant_ids: Vec<ProductId>,
}

impl ProductTemplate {
    pub fn new(id: TemplateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            shared_barcode: None,
            use_shared_barcode: false,
            variant_ids: Vec::new(),
        }
    }

    /// Reference used by variants of this template
    pub fn reference(&self) -> TemplateRef {
        TemplateRef::named(self.id, self.name.clone())
    }

    /// The shared barcode, only when sharing is enabled
    pub fn active_shared_barcode(&self) -> Option<&str> {
        if self.use_shared_barcode {
            self.shared_barcode.as_deref()
        } else {
            None
        }
    }
}

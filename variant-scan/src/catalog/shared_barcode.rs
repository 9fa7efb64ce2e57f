//! Shared-barcode catalog
//!
//! In-process catalog backend with the server-side barcode semantics the
//! scan pipeline relies on: a template may hand one barcode to all of its
//! variants, and a barcode lookup answers with a product, a
//! `multiple_variants` payload or null. Implements [`CatalogRpc`] so the
//! terminal host can run without a server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use pos_client::ClientResult;
use serde_json::Value;
use shared::lookup::VariantsPayload;
use shared::{
    CatalogSnapshot, ErrorCode, Product, ProductId, ProductTemplate, TemplateId,
    VariantCandidate,
};
use thiserror::Error;

use crate::lookup::CatalogRpc;

/// Extra field flagging a variant as sold in the POS
const AVAILABLE_IN_POS: &str = "available_in_pos";

/// Catalog validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Barcode {barcode} is already used by product {product_id}, which is not a variant of the same template")]
    DuplicateBarcode {
        barcode: String,
        product_id: ProductId,
    },

    #[error("Barcode {barcode} is already shared by template {template_id}")]
    SharedBarcodeTaken {
        barcode: String,
        template_id: TemplateId,
    },

    #[error("Template not found: {0}")]
    UnknownTemplate(TemplateId),

    #[error("Product not found: {0}")]
    UnknownProduct(ProductId),

    #[error("Product already exists: {0}")]
    DuplicateProduct(ProductId),

    #[error("Template already exists: {0}")]
    DuplicateTemplate(TemplateId),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::DuplicateBarcode { .. } | CatalogError::SharedBarcodeTaken { .. } => {
                ErrorCode::BarcodeDuplicate
            }
            CatalogError::UnknownTemplate(_) | CatalogError::UnknownProduct(_) => {
                ErrorCode::ProductNotFound
            }
            CatalogError::DuplicateProduct(_) | CatalogError::DuplicateTemplate(_) => {
                ErrorCode::ValidationFailed
            }
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A variant held by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogVariant {
    pub product: Product,
    pub available_in_pos: bool,
}

/// In-memory catalog with shared-barcode templates
#[derive(Debug, Clone, Default)]
pub struct LocalCatalog {
    templates: BTreeMap<TemplateId, ProductTemplate>,
    variants: BTreeMap<ProductId, CatalogVariant>,
}

impl LocalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a snapshot
    ///
    /// Templates are registered first; products are then attached to the
    /// template they reference. `available_in_pos` is read from the product
    /// record and defaults to true.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for template in snapshot.templates {
            catalog.add_template(template)?;
        }
        for product in snapshot.products {
            let available = product
                .extra
                .get(AVAILABLE_IN_POS)
                .and_then(Value::as_bool)
                .unwrap_or(true);
            match product.template_id() {
                Some(template_id) if catalog.templates.contains_key(&template_id) => {
                    catalog.add_variant(template_id, product, available)?
                }
                _ => catalog.add_product(product, available)?,
            }
        }
        Ok(catalog)
    }

    /// Snapshot of the POS-available products and every template
    pub fn snapshot(&self) -> CatalogSnapshot {
        let products = self
            .variants
            .values()
            .filter(|v| v.available_in_pos)
            .map(|v| v.product.clone())
            .collect();
        let templates = self.templates.values().cloned().collect();
        CatalogSnapshot::new(products, templates)
    }

    pub fn template(&self, id: TemplateId) -> Option<&ProductTemplate> {
        self.templates.get(&id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.variants.get(&id).map(|v| &v.product)
    }

    // ========== Mutations ==========

    /// Register a template
    ///
    /// Its variant list is rebuilt from the variants added afterwards.
    pub fn add_template(&mut self, mut template: ProductTemplate) -> CatalogResult<()> {
        if self.templates.contains_key(&template.id) {
            return Err(CatalogError::DuplicateTemplate(template.id));
        }
        if let Some(code) = template.active_shared_barcode() {
            self.ensure_unique(code, Some(template.id), None, true)?;
        }
        template.variant_ids.clear();
        self.templates.insert(template.id, template);
        Ok(())
    }

    /// Attach a variant to a template
    ///
    /// When the template shares a barcode, the variant receives it.
    pub fn add_variant(
        &mut self,
        template_id: TemplateId,
        mut product: Product,
        available_in_pos: bool,
    ) -> CatalogResult<()> {
        if self.variants.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }
        let template = self
            .templates
            .get(&template_id)
            .ok_or(CatalogError::UnknownTemplate(template_id))?;

        product.product_tmpl_id = Some(template.reference());
        let shared = template.active_shared_barcode().map(String::from);
        match shared {
            Some(code) => product.barcode = Some(code),
            None => {
                if let Some(code) = product.barcode.as_deref() {
                    self.ensure_unique(code, Some(template_id), Some(product.id), false)?;
                }
            }
        }

        if let Some(template) = self.templates.get_mut(&template_id) {
            template.variant_ids.push(product.id);
        }
        self.variants.insert(
            product.id,
            CatalogVariant {
                product,
                available_in_pos,
            },
        );
        Ok(())
    }

    /// Add a product that belongs to no registered template
    pub fn add_product(&mut self, product: Product, available_in_pos: bool) -> CatalogResult<()> {
        if self.variants.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }
        if let Some(code) = product.barcode.as_deref() {
            self.ensure_unique(code, product.template_id(), Some(product.id), false)?;
        }
        self.variants.insert(
            product.id,
            CatalogVariant {
                product,
                available_in_pos,
            },
        );
        Ok(())
    }

    /// Set or clear the barcode of one variant
    pub fn set_barcode(&mut self, product_id: ProductId, barcode: Option<String>) -> CatalogResult<()> {
        let variant = self
            .variants
            .get(&product_id)
            .ok_or(CatalogError::UnknownProduct(product_id))?;
        let template_id = variant.product.template_id();

        if let Some(code) = barcode.as_deref() {
            let shares_code = template_id
                .and_then(|id| self.templates.get(&id))
                .and_then(ProductTemplate::active_shared_barcode)
                == Some(code);
            self.ensure_unique(code, template_id, Some(product_id), shares_code)?;
        }

        if let Some(variant) = self.variants.get_mut(&product_id) {
            variant.product.barcode = barcode;
        }
        Ok(())
    }

    /// Change a template's shared barcode
    ///
    /// While sharing is enabled the new code is copied onto every variant.
    pub fn set_shared_barcode(
        &mut self,
        template_id: TemplateId,
        barcode: Option<String>,
    ) -> CatalogResult<()> {
        let template = self
            .templates
            .get(&template_id)
            .ok_or(CatalogError::UnknownTemplate(template_id))?;
        let enabled = template.use_shared_barcode;

        if enabled && let Some(code) = barcode.as_deref() {
            self.ensure_unique(code, Some(template_id), None, true)?;
        }

        if let Some(template) = self.templates.get_mut(&template_id) {
            template.shared_barcode = barcode;
        }
        if enabled {
            self.propagate(template_id);
        }
        Ok(())
    }

    /// Enable or disable barcode sharing for a template
    ///
    /// Enabling with a shared code copies it onto every variant; disabling
    /// clears every variant's barcode.
    pub fn set_use_shared_barcode(
        &mut self,
        template_id: TemplateId,
        enabled: bool,
    ) -> CatalogResult<()> {
        let template = self
            .templates
            .get(&template_id)
            .ok_or(CatalogError::UnknownTemplate(template_id))?;

        if enabled && let Some(code) = template.shared_barcode.clone() {
            self.ensure_unique(&code, Some(template_id), None, true)?;
        }

        if let Some(template) = self.templates.get_mut(&template_id) {
            template.use_shared_barcode = enabled;
        }
        if enabled {
            self.propagate(template_id);
        } else {
            self.clear_variant_barcodes(template_id);
        }
        Ok(())
    }

    fn variant_ids(&self, template_id: TemplateId) -> Vec<ProductId> {
        self.templates
            .get(&template_id)
            .map(|t| t.variant_ids.clone())
            .unwrap_or_default()
    }

    fn propagate(&mut self, template_id: TemplateId) {
        let Some(code) = self
            .templates
            .get(&template_id)
            .and_then(ProductTemplate::active_shared_barcode)
            .map(String::from)
        else {
            return;
        };
        for id in self.variant_ids(template_id) {
            if let Some(variant) = self.variants.get_mut(&id) {
                variant.product.barcode = Some(code.clone());
            }
        }
    }

    fn clear_variant_barcodes(&mut self, template_id: TemplateId) {
        for id in self.variant_ids(template_id) {
            if let Some(variant) = self.variants.get_mut(&id) {
                variant.product.barcode = None;
            }
        }
    }

    /// A barcode may repeat only across variants of one template that
    /// shares it
    fn ensure_unique(
        &self,
        code: &str,
        template_id: Option<TemplateId>,
        product_id: Option<ProductId>,
        shared: bool,
    ) -> CatalogResult<()> {
        for variant in self.variants.values() {
            if Some(variant.product.id) == product_id || !variant.product.has_barcode(code) {
                continue;
            }
            let same_template =
                template_id.is_some() && variant.product.template_id() == template_id;
            if !(shared && same_template) {
                return Err(CatalogError::DuplicateBarcode {
                    barcode: code.to_string(),
                    product_id: variant.product.id,
                });
            }
        }

        for template in self.templates.values() {
            if Some(template.id) != template_id && template.active_shared_barcode() == Some(code) {
                return Err(CatalogError::SharedBarcodeTaken {
                    barcode: code.to_string(),
                    template_id: template.id,
                });
            }
        }
        Ok(())
    }

    // ========== Lookup ==========

    /// Template whose enabled shared barcode equals `code`
    pub fn template_by_shared_barcode(&self, code: &str) -> Option<&ProductTemplate> {
        self.templates
            .values()
            .find(|t| t.active_shared_barcode() == Some(code))
    }

    /// POS-available products matching a barcode
    ///
    /// Products carrying the barcode come first; when none does, the
    /// variants of the template sharing it are used.
    pub fn matching_products(&self, code: &str) -> Vec<&Product> {
        let direct: Vec<&Product> = self
            .variants
            .values()
            .filter(|v| v.available_in_pos && v.product.has_barcode(code))
            .map(|v| &v.product)
            .collect();
        if !direct.is_empty() {
            return direct;
        }

        let Some(template) = self.template_by_shared_barcode(code) else {
            return Vec::new();
        };
        template
            .variant_ids
            .iter()
            .filter_map(|id| self.variants.get(id))
            .filter(|v| v.available_in_pos)
            .map(|v| &v.product)
            .collect()
    }

    /// Barcode lookup payload
    ///
    /// `None` when nothing matches, the product record for one match, a
    /// `multiple_variants` payload otherwise.
    pub fn product_by_barcode(&self, code: &str) -> Result<Option<Value>, serde_json::Error> {
        let matches = self.matching_products(code);
        match matches.as_slice() {
            [] => Ok(None),
            [product] => serde_json::to_value(product).map(Some),
            [first, ..] => {
                let candidates = matches.iter().copied().map(VariantCandidate::from).collect();
                let payload = VariantsPayload::new(first.product_tmpl_id.clone(), candidates);
                serde_json::to_value(payload).map(Some)
            }
        }
    }

    /// Products by id, skipping unknown ids
    pub fn read(&self, ids: &[ProductId]) -> Vec<Product> {
        ids.iter()
            .filter_map(|id| self.product(*id).cloned())
            .collect()
    }
}

#[async_trait]
impl CatalogRpc for LocalCatalog {
    async fn product_by_barcode(
        &self,
        _pos_config_id: i64,
        barcode: &str,
    ) -> ClientResult<Option<Value>> {
        Ok(LocalCatalog::product_by_barcode(self, barcode)?)
    }

    async fn read_products(&self, ids: &[ProductId]) -> ClientResult<Vec<Product>> {
        Ok(self.read(ids))
    }

    async fn load_catalog(&self, _pos_config_id: i64) -> ClientResult<CatalogSnapshot> {
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shirt_catalog() -> LocalCatalog {
        let mut catalog = LocalCatalog::new();
        let mut template = ProductTemplate::new(9, "Shirt");
        template.shared_barcode = Some("5099999".into());
        template.use_shared_barcode = true;
        catalog.add_template(template).unwrap();
        catalog
            .add_variant(9, Product::new(1, "Shirt").with_attribute_values(["Red", "S"]), true)
            .unwrap();
        catalog
            .add_variant(9, Product::new(2, "Shirt").with_attribute_values(["Blue", "M"]), true)
            .unwrap();
        catalog
            .add_product(Product::new(42, "Widget").with_barcode("5012345"), true)
            .unwrap();
        catalog
    }

    #[test]
    fn test_variants_receive_shared_barcode() {
        let catalog = shirt_catalog();
        assert_eq!(catalog.product(1).unwrap().barcode.as_deref(), Some("5099999"));
        assert_eq!(catalog.product(2).unwrap().barcode.as_deref(), Some("5099999"));
        assert_eq!(catalog.template(9).unwrap().variant_ids, vec![1, 2]);
        assert_eq!(catalog.product(1).unwrap().template_id(), Some(9));
    }

    #[test]
    fn test_disable_clears_and_enable_restores() {
        let mut catalog = shirt_catalog();

        catalog.set_use_shared_barcode(9, false).unwrap();
        assert!(catalog.product(1).unwrap().barcode.is_none());
        assert!(catalog.product(2).unwrap().barcode.is_none());

        catalog.set_use_shared_barcode(9, true).unwrap();
        assert_eq!(catalog.product(2).unwrap().barcode.as_deref(), Some("5099999"));
    }

    #[test]
    fn test_changing_shared_code_repropagates() {
        let mut catalog = shirt_catalog();
        catalog.set_shared_barcode(9, Some("5088888".into())).unwrap();

        assert_eq!(catalog.product(1).unwrap().barcode.as_deref(), Some("5088888"));
        assert!(catalog.product_by_barcode("5099999").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_barcode_across_templates_is_rejected() {
        let mut catalog = shirt_catalog();
        catalog.add_template(ProductTemplate::new(3, "Mug")).unwrap();

        let err = catalog
            .add_variant(3, Product::new(5, "Mug").with_barcode("5012345"), true)
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateBarcode {
                barcode: "5012345".into(),
                product_id: 42
            }
        );
        assert_eq!(err.code(), ErrorCode::BarcodeDuplicate);

        let err = catalog.set_barcode(42, Some("5099999".into())).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateBarcode { .. }));
    }

    #[test]
    fn test_repeat_within_template_requires_sharing() {
        let mut catalog = LocalCatalog::new();
        catalog.add_template(ProductTemplate::new(3, "Mug")).unwrap();
        catalog
            .add_variant(3, Product::new(5, "Mug").with_barcode("7000"), true)
            .unwrap();

        let err = catalog
            .add_variant(3, Product::new(6, "Mug").with_barcode("7000"), true)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateBarcode { product_id: 5, .. }));
    }

    #[test]
    fn test_duplicate_template_keeps_variants() {
        let mut catalog = shirt_catalog();

        let err = catalog.add_template(ProductTemplate::new(9, "Shirt")).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateTemplate(9));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(catalog.template(9).unwrap().variant_ids, vec![1, 2]);
        assert!(catalog.template_by_shared_barcode("5099999").is_some());
    }

    #[test]
    fn test_enabling_taken_code_is_rejected() {
        let mut catalog = shirt_catalog();
        let mut template = ProductTemplate::new(3, "Mug");
        template.shared_barcode = Some("5012345".into());
        catalog.add_template(template).unwrap();

        let err = catalog.set_use_shared_barcode(3, true).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateBarcode { product_id: 42, .. }));
        assert!(!catalog.template(3).unwrap().use_shared_barcode);
    }

    #[test]
    fn test_lookup_single_product() {
        let catalog = shirt_catalog();
        let payload = catalog.product_by_barcode("5012345").unwrap().unwrap();
        assert_eq!(payload["id"], 42);
        assert_eq!(payload["name"], "Widget");
    }

    #[test]
    fn test_lookup_multiple_variants() {
        let catalog = shirt_catalog();
        let payload = catalog.product_by_barcode("5099999").unwrap().unwrap();
        assert_eq!(payload["multiple_variants"], json!(true));
        assert_eq!(payload["product_tmpl_id"], json!([9, "Shirt"]));
        assert_eq!(payload["variants"][0]["combination_name"], json!(["Red", "S"]));
        assert_eq!(payload["variants"][1]["id"], 2);
    }

    #[test]
    fn test_lookup_falls_back_to_template_code() {
        let mut catalog = shirt_catalog();
        // Variant barcodes cleared by hand, template still shares the code
        catalog.set_barcode(1, None).unwrap();
        catalog.set_barcode(2, None).unwrap();

        let payload = catalog.product_by_barcode("5099999").unwrap().unwrap();
        assert_eq!(payload["variants"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_lookup_skips_unavailable_variants() {
        let mut catalog = shirt_catalog();
        catalog
            .add_variant(9, Product::new(3, "Shirt").with_attribute_values(["Green", "L"]), false)
            .unwrap();

        let payload = catalog.product_by_barcode("5099999").unwrap().unwrap();
        assert_eq!(payload["variants"].as_array().unwrap().len(), 2);
        assert!(catalog.product_by_barcode("0000000").unwrap().is_none());
    }

    #[test]
    fn test_from_snapshot_round_trip() {
        let catalog = shirt_catalog();
        let rebuilt = LocalCatalog::from_snapshot(catalog.snapshot()).unwrap();

        assert_eq!(rebuilt.template(9).unwrap().variant_ids, vec![1, 2]);
        assert_eq!(rebuilt.read(&[42, 1, 77]).len(), 2);
    }

    #[test]
    fn test_from_snapshot_reads_availability() {
        let snapshot: CatalogSnapshot = serde_json::from_value(json!({
            "products": [
                {"id": 1, "name": "Shirt", "product_tmpl_id": [9, "Shirt"]},
                {"id": 2, "name": "Shirt", "product_tmpl_id": [9, "Shirt"], "available_in_pos": false}
            ],
            "templates": [
                {"id": 9, "name": "Shirt", "shared_barcode": "5099999", "use_shared_barcode": true}
            ]
        }))
        .unwrap();

        let catalog = LocalCatalog::from_snapshot(snapshot).unwrap();
        let payload = catalog.product_by_barcode("5099999").unwrap().unwrap();
        assert_eq!(payload["id"], 1);
        assert_eq!(catalog.snapshot().products.len(), 1);
    }

    #[tokio::test]
    async fn test_rpc_surface() {
        let catalog = shirt_catalog();
        let rpc: &dyn CatalogRpc = &catalog;

        let payload = rpc.product_by_barcode(1, "5012345").await.unwrap();
        assert!(payload.is_some());
        assert_eq!(rpc.read_products(&[2]).await.unwrap()[0].id, 2);
        assert_eq!(rpc.load_catalog(1).await.unwrap().templates.len(), 1);
    }
}

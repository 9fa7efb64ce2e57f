//! Product Cache - in-memory product records keyed by id
//!
//! The host POS keeps every loaded product in memory. The scan pipeline only
//! needs lookup by id, lookup by raw barcode and bulk insertion, so those
//! form the [`ProductCache`] seam. [`CatalogCache`] is the default
//! implementation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use shared::{Product, ProductId, ProductTemplate, TemplateId, TemplateRef};

// =============================================================================
// Trait
// =============================================================================

/// Host product cache
///
/// Methods take `&self`; implementations use interior mutability so the
/// cache can be shared between the dispatcher and the host.
pub trait ProductCache: Send + Sync {
    /// Product by id
    fn get(&self, id: ProductId) -> Option<Product>;

    /// Products whose raw barcode equals `code`, ordered by id
    fn find_by_barcode(&self, code: &str) -> Vec<Product>;

    /// Insert or overwrite products (last write wins)
    ///
    /// A record without a template reference keeps the reference already
    /// cached for the same id.
    fn insert_products(&self, products: Vec<Product>);

    /// Set the template reference of a cached product
    ///
    /// Returns `true` when the cached entry changed.
    fn set_template(&self, id: ProductId, template: &TemplateRef) -> bool;

    /// Number of cached products
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or overwrite templates
    ///
    /// Caches without template data ignore this.
    fn insert_templates(&self, _templates: Vec<ProductTemplate>) {}

    /// Template whose shared barcode is enabled and equals `code`
    fn template_by_shared_barcode(&self, _code: &str) -> Option<ProductTemplate> {
        None
    }

    /// Cached variants of a template, ordered by id
    fn variants_of(&self, _template: TemplateId) -> Vec<Product> {
        Vec::new()
    }
}

// =============================================================================
// CatalogCache
// =============================================================================

#[derive(Debug, Default)]
struct Products {
    by_id: HashMap<ProductId, Product>,
    /// Raw barcode -> product ids
    by_barcode: HashMap<String, BTreeSet<ProductId>>,
}

impl Products {
    fn upsert(&mut self, mut product: Product) {
        if let Some(previous) = self.by_id.remove(&product.id) {
            if product.product_tmpl_id.is_none() {
                product.product_tmpl_id = previous.product_tmpl_id;
            }
            if let Some(code) = previous.barcode.as_deref() {
                self.unindex(code, previous.id);
            }
        }
        if let Some(code) = product.barcode.clone() {
            self.by_barcode.entry(code).or_default().insert(product.id);
        }
        self.by_id.insert(product.id, product);
    }

    fn unindex(&mut self, code: &str, id: ProductId) {
        if let Some(ids) = self.by_barcode.get_mut(code) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_barcode.remove(code);
            }
        }
    }
}

/// Default in-memory [`ProductCache`]
#[derive(Clone, Default)]
pub struct CatalogCache {
    products: Arc<RwLock<Products>>,
    /// Templates cache: id -> ProductTemplate
    templates: Arc<RwLock<HashMap<TemplateId, ProductTemplate>>>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("products_count", &self.products.read().by_id.len())
            .field("templates_count", &self.templates.read().len())
            .finish()
    }
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached templates
    pub fn template_count(&self) -> usize {
        self.templates.read().len()
    }

    pub fn template(&self, id: TemplateId) -> Option<ProductTemplate> {
        self.templates.read().get(&id).cloned()
    }
}

impl ProductCache for CatalogCache {
    fn get(&self, id: ProductId) -> Option<Product> {
        self.products.read().by_id.get(&id).cloned()
    }

    fn find_by_barcode(&self, code: &str) -> Vec<Product> {
        let products = self.products.read();
        products
            .by_barcode
            .get(code)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| products.by_id.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert_products(&self, products: Vec<Product>) {
        let mut cache = self.products.write();
        for product in products {
            cache.upsert(product);
        }
    }

    fn set_template(&self, id: ProductId, template: &TemplateRef) -> bool {
        let mut cache = self.products.write();
        match cache.by_id.get_mut(&id) {
            Some(product) if product.product_tmpl_id.as_ref() != Some(template) => {
                product.product_tmpl_id = Some(template.clone());
                true
            }
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.products.read().by_id.len()
    }

    fn insert_templates(&self, templates: Vec<ProductTemplate>) {
        let mut cache = self.templates.write();
        for template in templates {
            cache.insert(template.id, template);
        }
    }

    fn template_by_shared_barcode(&self, code: &str) -> Option<ProductTemplate> {
        self.templates
            .read()
            .values()
            .filter(|t| t.active_shared_barcode() == Some(code))
            .min_by_key(|t| t.id)
            .cloned()
    }

    fn variants_of(&self, template: TemplateId) -> Vec<Product> {
        let listed: BTreeSet<ProductId> = self
            .templates
            .read()
            .get(&template)
            .map(|t| t.variant_ids.iter().copied().collect())
            .unwrap_or_default();

        let products = self.products.read();
        let mut ids: BTreeSet<ProductId> = products
            .by_id
            .values()
            .filter(|p| p.template_id() == Some(template))
            .map(|p| p.id)
            .collect();
        ids.extend(listed.into_iter().filter(|id| products.by_id.contains_key(id)));

        ids.iter()
            .filter_map(|id| products.by_id.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt_template() -> ProductTemplate {
        let mut template = ProductTemplate::new(9, "Shirt");
        template.shared_barcode = Some("5099999".into());
        template.use_shared_barcode = true;
        template.variant_ids = vec![1, 2];
        template
    }

    #[test]
    fn test_last_write_wins() {
        let cache = CatalogCache::new();
        cache.insert_products(vec![Product::new(1, "Old").with_barcode("111")]);
        cache.insert_products(vec![Product::new(1, "New").with_barcode("222")]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(1).unwrap().name, "New");
        assert!(cache.find_by_barcode("111").is_empty());
        assert_eq!(cache.find_by_barcode("222").len(), 1);
    }

    #[test]
    fn test_insert_keeps_template_ref() {
        let cache = CatalogCache::new();
        cache.insert_products(vec![
            Product::new(1, "Shirt").with_template(TemplateRef::named(9, "Shirt")),
        ]);
        cache.insert_products(vec![Product::new(1, "Shirt")]);

        assert_eq!(cache.get(1).unwrap().template_id(), Some(9));
    }

    #[test]
    fn test_find_by_barcode_is_ordered() {
        let cache = CatalogCache::new();
        cache.insert_products(vec![
            Product::new(5, "B").with_barcode("777"),
            Product::new(3, "A").with_barcode("777"),
            Product::new(4, "C").with_barcode("888"),
        ]);

        let ids: Vec<_> = cache.find_by_barcode("777").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn test_set_template_reports_change() {
        let cache = CatalogCache::new();
        cache.insert_products(vec![Product::new(1, "Shirt")]);
        let template = TemplateRef::named(9, "Shirt");

        assert!(cache.set_template(1, &template));
        assert!(!cache.set_template(1, &template));
        assert!(!cache.set_template(99, &template));
    }

    #[test]
    fn test_shared_barcode_only_when_enabled() {
        let cache = CatalogCache::new();
        let mut disabled = shirt_template();
        disabled.id = 10;
        disabled.shared_barcode = Some("5011111".into());
        disabled.use_shared_barcode = false;
        cache.insert_templates(vec![shirt_template(), disabled]);

        assert_eq!(cache.template_by_shared_barcode("5099999").unwrap().id, 9);
        assert!(cache.template_by_shared_barcode("5011111").is_none());
        assert_eq!(cache.template_count(), 2);
    }

    #[test]
    fn test_variants_of_merges_listed_and_referencing() {
        let cache = CatalogCache::new();
        cache.insert_templates(vec![shirt_template()]);
        cache.insert_products(vec![
            Product::new(2, "Shirt"),
            Product::new(7, "Shirt").with_template(TemplateRef::new(9)),
            Product::new(8, "Mug").with_template(TemplateRef::new(3)),
        ]);

        let ids: Vec<_> = cache.variants_of(9).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 7]);
    }
}

//! Template enrichment
//!
//! Variant grouping needs every cached product to know its template. Once a
//! batch of records is in the cache, each record carrying a template
//! reference overwrites the cached entry's reference. Records without one
//! never clear it.

use shared::{CatalogSnapshot, Product};

use super::ProductCache;

/// Copy template references from `records` onto their cached entries
///
/// Returns the number of cached entries that changed. Running it again
/// with the same records changes nothing.
pub fn enrich_templates(cache: &dyn ProductCache, records: &[Product]) -> usize {
    records
        .iter()
        .filter_map(|record| record.product_tmpl_id.as_ref().map(|t| (record.id, t)))
        .filter(|(id, template)| cache.set_template(*id, template))
        .count()
}

/// Bulk-load hook: insert a freshly loaded catalog, then enrich
///
/// Returns the number of product records loaded.
pub fn load_snapshot(cache: &dyn ProductCache, snapshot: CatalogSnapshot) -> usize {
    let CatalogSnapshot {
        products,
        templates,
    } = snapshot;
    let count = products.len();

    cache.insert_templates(templates);
    cache.insert_products(products.clone());
    let enriched = enrich_templates(cache, &products);

    tracing::info!(products = count, enriched, "Catalog loaded into cache");
    count
}

/// Insert one individually fetched product, then enrich
pub fn insert_fetched(cache: &dyn ProductCache, product: Product) {
    let records = [product];
    cache.insert_products(records.to_vec());
    enrich_templates(cache, &records);
}

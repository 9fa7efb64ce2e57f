//! Catalog - product cache, template enrichment and the shared-barcode
//! catalog backend

pub mod cache;
pub mod enrichment;
pub mod shared_barcode;

pub use cache::{CatalogCache, ProductCache};
pub use enrichment::{enrich_templates, insert_fetched, load_snapshot};
pub use shared_barcode::{CatalogError, CatalogVariant, LocalCatalog};

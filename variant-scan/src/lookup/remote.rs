//! Remote barcode lookup

use std::sync::Arc;

use async_trait::async_trait;
use pos_client::{ClientError, ClientResult, HttpClient};
use serde_json::Value;
use shared::{CatalogSnapshot, LookupResult, Product, ProductId};

use super::VariantResolver;
use crate::catalog::{ProductCache, insert_fetched};
use crate::core::{ScanError, ScanResult};

/// Remote calls the scan pipeline depends on
#[async_trait]
pub trait CatalogRpc: Send + Sync {
    /// Raw barcode lookup payload, `None` when nothing matched
    async fn product_by_barcode(
        &self,
        pos_config_id: i64,
        barcode: &str,
    ) -> ClientResult<Option<Value>>;

    /// Product records by id (zero or one per id)
    async fn read_products(&self, ids: &[ProductId]) -> ClientResult<Vec<Product>>;

    /// Products and templates loaded when a session opens
    async fn load_catalog(&self, pos_config_id: i64) -> ClientResult<CatalogSnapshot>;
}

#[async_trait]
impl CatalogRpc for HttpClient {
    async fn product_by_barcode(
        &self,
        pos_config_id: i64,
        barcode: &str,
    ) -> ClientResult<Option<Value>> {
        HttpClient::product_by_barcode(self, pos_config_id, barcode).await
    }

    async fn read_products(&self, ids: &[ProductId]) -> ClientResult<Vec<Product>> {
        HttpClient::read_products(self, ids).await
    }

    async fn load_catalog(&self, pos_config_id: i64) -> ClientResult<CatalogSnapshot> {
        HttpClient::load_catalog(self, pos_config_id).await
    }
}

/// Fetch one product record by id and insert it into `cache`
///
/// A failed call or a record missing from the answer is
/// [`ScanError::Fetch`]; the cache is left untouched then.
pub async fn fetch_product(
    rpc: &dyn CatalogRpc,
    cache: &dyn ProductCache,
    product_id: ProductId,
) -> ScanResult<Product> {
    let records = rpc
        .read_products(&[product_id])
        .await
        .map_err(|source| ScanError::Fetch { product_id, source })?;

    let product = records
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| ScanError::Fetch {
            product_id,
            source: ClientError::InvalidResponse(format!(
                "product {product_id} missing from read result"
            )),
        })?;

    insert_fetched(cache, product.clone());
    tracing::info!(product_id, "Fetched product record");
    Ok(product)
}

/// Single remote lookup per scan, no retry
#[derive(Clone)]
pub struct VariantRemoteLookup {
    rpc: Arc<dyn CatalogRpc>,
    pos_config_id: i64,
}

impl VariantRemoteLookup {
    pub fn new(rpc: Arc<dyn CatalogRpc>, pos_config_id: i64) -> Self {
        Self { rpc, pos_config_id }
    }

    pub fn pos_config_id(&self) -> i64 {
        self.pos_config_id
    }

    /// Ask the server what `code` resolves to
    ///
    /// Unreachable servers and malformed answers fail with
    /// [`ScanError::Network`]. A variants answer with a single entry only
    /// names the variant, so its full record comes from `cache` or from
    /// one fetch by id ([`ScanError::Fetch`] when that fails).
    pub async fn lookup(&self, code: &str, cache: &dyn ProductCache) -> ScanResult<LookupResult> {
        let raw = self
            .rpc
            .product_by_barcode(self.pos_config_id, code)
            .await
            .map_err(|source| ScanError::Network {
                barcode: code.to_string(),
                source,
            })?;

        let result =
            VariantResolver::classify(raw.as_ref()).map_err(|source| ScanError::Network {
                barcode: code.to_string(),
                source,
            })?;

        tracing::debug!(barcode = %code, result = result.kind(), "Remote barcode lookup");

        let single_variant = match &result {
            LookupResult::SingleProduct(product)
                if raw.as_ref().is_some_and(VariantResolver::is_variants_payload) =>
            {
                Some(product.id)
            }
            _ => None,
        };
        match single_variant {
            Some(product_id) => {
                let product = match cache.get(product_id) {
                    Some(product) => product,
                    None => fetch_product(self.rpc.as_ref(), cache, product_id).await?,
                };
                Ok(LookupResult::SingleProduct(product))
            }
            None => Ok(result),
        }
    }
}

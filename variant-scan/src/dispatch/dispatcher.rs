//! Scan dispatcher - entry point for the host's barcode-scan event
//!
//! ```text
//! on_scan(code)
//!   ├─ classify: not a product code → DefaultScanHandler
//!   ├─ VariantRemoteLookup (NetworkError → NotFound)
//!   ├─ NotFound → local cache fallback (miss after NetworkError → connection popup)
//!   ├─ SingleProduct → append
//!   └─ MultipleVariants → VariantSelectionFlow → append | Cancelled
//! ```
//!
//! Every failure ends in at most one operator popup; nothing escapes
//! `on_scan`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use shared::{CatalogSnapshot, ErrorCode, LookupResult, Product, ProductId, VariantCandidate};
use tokio::sync::Mutex;

use super::classifier::{BarcodeClassifier, BarcodeKind};
use crate::catalog::{ProductCache, load_snapshot};
use crate::core::{ScanError, ScanResult};
use crate::lookup::{CatalogRpc, VariantRemoteLookup};
use crate::operator::OperatorPrompt;
use crate::order::OrderAppender;
use crate::selection::{Selection, VariantSelectionFlow};

/// Result of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Appended { product_id: ProductId },
    Cancelled,
    NotFound,
    Error(ErrorCode),
    /// Consumed by the host default handler
    Handled,
}

/// Host behavior for codes that are not product codes
#[async_trait]
pub trait DefaultScanHandler: Send + Sync {
    async fn handle(&self, code: &str, kind: BarcodeKind) -> ScanOutcome;
}

/// Default handler that only logs the code
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl DefaultScanHandler for PassThrough {
    async fn handle(&self, code: &str, kind: BarcodeKind) -> ScanOutcome {
        tracing::info!(barcode = %code, kind = %kind, "Non-product code left to the host");
        ScanOutcome::Handled
    }
}

/// Local lookup options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Search the cache when the server finds nothing
    pub local_fallback: bool,
    /// Local search also matches template shared barcodes
    pub match_shared_barcode: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            local_fallback: true,
            match_shared_barcode: true,
        }
    }
}

/// Scan entry point, built once per session by
/// [`ScanDispatcherBuilder`](super::ScanDispatcherBuilder)
pub struct ScanDispatcher {
    pub(super) rpc: Arc<dyn CatalogRpc>,
    pub(super) remote: VariantRemoteLookup,
    pub(super) selection: VariantSelectionFlow,
    pub(super) classifier: Arc<dyn BarcodeClassifier>,
    pub(super) cache: Arc<dyn ProductCache>,
    pub(super) order: Arc<dyn OrderAppender>,
    pub(super) operator: Arc<dyn OperatorPrompt>,
    pub(super) default_handler: Arc<dyn DefaultScanHandler>,
    pub(super) options: ScanOptions,
    /// Held for the whole scan, selection popup included
    pub(super) busy: Mutex<()>,
}

impl std::fmt::Debug for ScanDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanDispatcher")
            .field("pos_config_id", &self.remote.pos_config_id())
            .field("cached_products", &self.cache.len())
            .field("options", &self.options)
            .finish()
    }
}

impl ScanDispatcher {
    pub fn cache(&self) -> &Arc<dyn ProductCache> {
        &self.cache
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    /// Handle one scanned code
    ///
    /// Scans are serialized: a second call waits until the first one,
    /// including any open selection popup, is finished.
    pub async fn on_scan(&self, code: &str) -> ScanOutcome {
        let _guard = self.busy.lock().await;

        let kind = self.classify(code);
        if kind != BarcodeKind::Product {
            tracing::debug!(barcode = %code, kind = %kind, "Delegating to default scan handler");
            return self.default_handler.handle(code, kind).await;
        }

        match self.resolve(code).await {
            Ok(outcome) => outcome,
            Err(err) => self.report(err).await,
        }
    }

    /// Bulk-load hook: fetch the session catalog and fill the cache
    pub async fn load_catalog(&self) -> ScanResult<usize> {
        let snapshot = self
            .rpc
            .load_catalog(self.remote.pos_config_id())
            .await
            .map_err(ScanError::CatalogLoad)?;
        Ok(self.load_products(snapshot))
    }

    /// Bulk-load hook for records the host loaded itself
    pub fn load_products(&self, snapshot: CatalogSnapshot) -> usize {
        load_snapshot(self.cache.as_ref(), snapshot)
    }

    fn classify(&self, code: &str) -> BarcodeKind {
        let kind = self.classifier.classify(code);
        if kind == BarcodeKind::Error && self.cache.template_by_shared_barcode(code).is_some() {
            tracing::debug!(barcode = %code, "Shared template barcode reclassified as product");
            return BarcodeKind::Product;
        }
        kind
    }

    async fn resolve(&self, code: &str) -> ScanResult<ScanOutcome> {
        let (remote, lookup_error) = match self.remote.lookup(code, self.cache.as_ref()).await {
            Ok(result) => (result, None),
            Err(err @ ScanError::Network { .. }) => {
                tracing::warn!(barcode = %code, error = %err, "Barcode lookup failed, falling back to local cache");
                (LookupResult::NotFound, Some(err))
            }
            Err(err) => return Err(err),
        };

        let result = if remote.is_not_found() {
            self.local_lookup(code)
        } else {
            remote
        };

        match result {
            LookupResult::NotFound => Err(lookup_error.unwrap_or_else(|| ScanError::NotFound {
                barcode: code.to_string(),
            })),
            LookupResult::SingleProduct(product) => {
                let product = self.cache.get(product.id).unwrap_or(product);
                self.append(&product)
            }
            LookupResult::MultipleVariants { candidates, .. } => {
                match self
                    .selection
                    .resolve(code, &candidates, self.cache.as_ref())
                    .await?
                {
                    Selection::Product(product) => self.append(&product),
                    Selection::Cancelled => Ok(ScanOutcome::Cancelled),
                }
            }
        }
    }

    /// Cache search by raw barcode, plus template shared barcodes
    fn local_lookup(&self, code: &str) -> LookupResult {
        if !self.options.local_fallback {
            return LookupResult::NotFound;
        }

        let mut found: BTreeMap<ProductId, Product> = self
            .cache
            .find_by_barcode(code)
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut template = None;
        if self.options.match_shared_barcode
            && let Some(shared) = self.cache.template_by_shared_barcode(code)
        {
            found.extend(self.cache.variants_of(shared.id).into_iter().map(|p| (p.id, p)));
            template = Some(shared.reference());
        }

        tracing::debug!(barcode = %code, matches = found.len(), "Local cache lookup");

        let mut products: Vec<Product> = found.into_values().collect();
        match products.len() {
            0 => LookupResult::NotFound,
            1 => LookupResult::SingleProduct(products.remove(0)),
            _ => LookupResult::MultipleVariants {
                template: template.or_else(|| products[0].product_tmpl_id.clone()),
                candidates: products.iter().map(VariantCandidate::from).collect(),
            },
        }
    }

    fn append(&self, product: &Product) -> ScanResult<ScanOutcome> {
        self.order
            .add_product(product)
            .map_err(|e| ScanError::Order {
                product_id: product.id,
                reason: e.to_string(),
            })?;
        tracing::info!(product_id = product.id, name = %product.name, "Product added to order");
        Ok(ScanOutcome::Appended {
            product_id: product.id,
        })
    }

    async fn report(&self, err: ScanError) -> ScanOutcome {
        let code = err.code();
        tracing::warn!(
            error = %err,
            code = code.code(),
            category = code.category().name(),
            reason = code.message(),
            "Scan not completed"
        );
        self.operator.show_error(err.popup()).await;
        match err {
            ScanError::NotFound { .. } | ScanError::Network { .. } => ScanOutcome::NotFound,
            _ => ScanOutcome::Error(code),
        }
    }
}

//! Startup wiring for [`ScanDispatcher`]
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = ScanDispatcherBuilder::new()
//!     .rpc(Arc::new(http_client))
//!     .pos_config_id(1)
//!     .order(order.clone())
//!     .operator(Arc::new(TerminalOperator::new(input)))
//!     .build()?;
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

use super::classifier::{BarcodeClassifier, Nomenclature};
use super::dispatcher::{DefaultScanHandler, PassThrough, ScanDispatcher, ScanOptions};
use crate::catalog::{CatalogCache, ProductCache};
use crate::core::{Config, ScanError, ScanResult};
use crate::lookup::{CatalogRpc, VariantRemoteLookup};
use crate::operator::OperatorPrompt;
use crate::order::OrderAppender;
use crate::selection::VariantSelectionFlow;

/// Builder for [`ScanDispatcher`]
///
/// `rpc`, `order` and `operator` are required. The rest default to an
/// empty [`CatalogCache`], the default [`Nomenclature`] and [`PassThrough`].
#[derive(Default)]
pub struct ScanDispatcherBuilder {
    rpc: Option<Arc<dyn CatalogRpc>>,
    pos_config_id: Option<i64>,
    cache: Option<Arc<dyn ProductCache>>,
    order: Option<Arc<dyn OrderAppender>>,
    operator: Option<Arc<dyn OperatorPrompt>>,
    classifier: Option<Arc<dyn BarcodeClassifier>>,
    default_handler: Option<Arc<dyn DefaultScanHandler>>,
    options: ScanOptions,
}

impl ScanDispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the POS configuration id and lookup options from `config`
    pub fn config(mut self, config: &Config) -> Self {
        self.pos_config_id = Some(config.pos_config_id);
        self.options = ScanOptions {
            local_fallback: config.local_fallback,
            match_shared_barcode: config.match_shared_barcode,
        };
        self
    }

    pub fn rpc(mut self, rpc: Arc<dyn CatalogRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    pub fn pos_config_id(mut self, id: i64) -> Self {
        self.pos_config_id = Some(id);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ProductCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn order(mut self, order: Arc<dyn OrderAppender>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn operator(mut self, operator: Arc<dyn OperatorPrompt>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn BarcodeClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn default_handler(mut self, handler: Arc<dyn DefaultScanHandler>) -> Self {
        self.default_handler = Some(handler);
        self
    }

    pub fn options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Config` if a required collaborator is missing.
    pub fn build(self) -> ScanResult<ScanDispatcher> {
        let rpc = self
            .rpc
            .ok_or_else(|| ScanError::Config("rpc is required".into()))?;
        let order = self
            .order
            .ok_or_else(|| ScanError::Config("order is required".into()))?;
        let operator = self
            .operator
            .ok_or_else(|| ScanError::Config("operator is required".into()))?;
        let pos_config_id = self
            .pos_config_id
            .ok_or_else(|| ScanError::Config("pos_config_id is required".into()))?;

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(CatalogCache::new()));
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(Nomenclature::default()));
        let default_handler = self.default_handler.unwrap_or_else(|| Arc::new(PassThrough));

        Ok(ScanDispatcher {
            remote: VariantRemoteLookup::new(rpc.clone(), pos_config_id),
            selection: VariantSelectionFlow::new(rpc.clone(), operator.clone()),
            rpc,
            classifier,
            cache,
            order,
            operator,
            default_handler,
            options: self.options,
            busy: Mutex::new(()),
        })
    }
}

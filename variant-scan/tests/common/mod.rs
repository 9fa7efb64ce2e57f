// variant-scan/tests/common/mod.rs
// Hand-written collaborators for the scan pipeline tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pos_client::{ClientError, ClientResult};
use serde_json::{Value, json};
use shared::{CatalogSnapshot, Product, ProductId, ProductTemplate, TemplateRef};
use tokio::sync::oneshot;
use variant_scan::dispatch::BarcodeKind;
use variant_scan::{
    BarcodeClassifier, CatalogCache, CatalogRpc, DefaultScanHandler, ErrorPopup, InMemoryOrder,
    OperatorPrompt, OrderAppender, OrderError, ProductCache, ScanDispatcher,
    ScanDispatcherBuilder, ScanOptions, ScanOutcome, SelectionPopup,
};

// ============================================================================
// Fixtures
// ============================================================================

pub fn widget() -> Product {
    Product::new(42, "Widget")
        .with_barcode("5012345")
        .with_template(TemplateRef::named(7, "Widget"))
        .with_field("lst_price", 9.5)
}

pub fn shirt(id: ProductId, values: [&str; 2]) -> Product {
    Product::new(id, "Shirt")
        .with_barcode("5099999")
        .with_template(TemplateRef::named(9, "Shirt"))
        .with_attribute_values(values)
}

pub fn shirt_template() -> ProductTemplate {
    let mut template = ProductTemplate::new(9, "Shirt");
    template.shared_barcode = Some("5099999".into());
    template.use_shared_barcode = true;
    template.variant_ids = vec![1, 2];
    template
}

pub fn two_shirts_payload() -> Value {
    json!({
        "multiple_variants": true,
        "product_tmpl_id": [9, "Shirt"],
        "variants": [
            {"id": 1, "name": "Shirt", "combination_name": ["Red", "S"]},
            {"id": 2, "name": "Shirt", "combination_name": ["Blue", "M"]}
        ]
    })
}

// ============================================================================
// Remote
// ============================================================================

/// Scripted answer to a barcode lookup
#[derive(Debug, Clone)]
pub enum Answer {
    Payload(Value),
    Null,
    Unreachable,
    Malformed,
}

/// Call-counting remote
#[derive(Default)]
pub struct FakeRpc {
    answers: Mutex<HashMap<String, Answer>>,
    records: Mutex<HashMap<ProductId, Product>>,
    snapshot: Mutex<CatalogSnapshot>,
    fail_fetch: Mutex<bool>,
    lookups: AtomicUsize,
    fetches: Mutex<Vec<Vec<ProductId>>>,
}

impl FakeRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, barcode: &str, answer: Answer) -> Self {
        self.answers.lock().unwrap().insert(barcode.to_string(), answer);
        self
    }

    /// Record served by fetch-by-id
    pub fn record(self, product: Product) -> Self {
        self.records.lock().unwrap().insert(product.id, product);
        self
    }

    pub fn snapshot(self, snapshot: CatalogSnapshot) -> Self {
        *self.snapshot.lock().unwrap() = snapshot;
        self
    }

    pub fn failing_fetch(self) -> Self {
        *self.fail_fetch.lock().unwrap() = true;
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> Vec<Vec<ProductId>> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogRpc for FakeRpc {
    async fn product_by_barcode(
        &self,
        _pos_config_id: i64,
        barcode: &str,
    ) -> ClientResult<Option<Value>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .get(barcode)
            .cloned()
            .unwrap_or(Answer::Null);
        match answer {
            Answer::Payload(value) => Ok(Some(value)),
            Answer::Null => Ok(None),
            Answer::Unreachable => Err(ClientError::Internal("connection refused".into())),
            Answer::Malformed => Err(ClientError::InvalidResponse("<html>".into())),
        }
    }

    async fn read_products(&self, ids: &[ProductId]) -> ClientResult<Vec<Product>> {
        self.fetches.lock().unwrap().push(ids.to_vec());
        if *self.fail_fetch.lock().unwrap() {
            return Err(ClientError::Internal("server error".into()));
        }
        let records = self.records.lock().unwrap();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn load_catalog(&self, _pos_config_id: i64) -> ClientResult<CatalogSnapshot> {
        Ok(self.snapshot.lock().unwrap().clone())
    }
}

// ============================================================================
// Operator
// ============================================================================

/// Answers selections from a script, records every popup
#[derive(Default)]
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<Option<usize>>>,
    pub errors: Mutex<Vec<ErrorPopup>>,
    pub selections: Mutex<Vec<SelectionPopup>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choosing(answers: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn selection_count(&self) -> usize {
        self.selections.lock().unwrap().len()
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedOperator {
    async fn show_error(&self, popup: ErrorPopup) {
        self.errors.lock().unwrap().push(popup);
    }

    async fn select(&self, popup: SelectionPopup) -> Option<usize> {
        self.selections.lock().unwrap().push(popup);
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

/// Holds the selection popup open until released
pub struct GatedOperator {
    gate: Mutex<Option<oneshot::Receiver<Option<usize>>>>,
}

impl GatedOperator {
    pub fn new() -> (Self, oneshot::Sender<Option<usize>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                gate: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl OperatorPrompt for GatedOperator {
    async fn show_error(&self, _popup: ErrorPopup) {}

    async fn select(&self, _popup: SelectionPopup) -> Option<usize> {
        let rx = self.gate.lock().unwrap().take()?;
        rx.await.ok().flatten()
    }
}

// ============================================================================
// Host
// ============================================================================

/// Default scan handler recording what it was given
#[derive(Default)]
pub struct RecordingHandler {
    pub seen: Mutex<Vec<(String, BarcodeKind)>>,
}

#[async_trait]
impl DefaultScanHandler for RecordingHandler {
    async fn handle(&self, code: &str, kind: BarcodeKind) -> ScanOutcome {
        self.seen.lock().unwrap().push((code.to_string(), kind));
        ScanOutcome::Handled
    }
}

/// Order that refuses everything
pub struct ClosedOrder;

impl OrderAppender for ClosedOrder {
    fn add_product(&self, _product: &Product) -> Result<(), OrderError> {
        Err(OrderError::NoOpenOrder)
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub dispatcher: ScanDispatcher,
    pub rpc: Arc<FakeRpc>,
    pub operator: Arc<ScriptedOperator>,
    pub order: Arc<InMemoryOrder>,
    pub cache: Arc<CatalogCache>,
    pub handler: Arc<RecordingHandler>,
}

impl Harness {
    pub fn new(rpc: FakeRpc, operator: ScriptedOperator) -> Self {
        Self::with(rpc, operator, ScanOptions::default(), None)
    }

    pub fn with(
        rpc: FakeRpc,
        operator: ScriptedOperator,
        options: ScanOptions,
        classifier: Option<Arc<dyn BarcodeClassifier>>,
    ) -> Self {
        let rpc = Arc::new(rpc);
        let operator = Arc::new(operator);
        let order = Arc::new(InMemoryOrder::new());
        let cache = Arc::new(CatalogCache::new());
        let handler = Arc::new(RecordingHandler::default());

        let mut builder = ScanDispatcherBuilder::new()
            .rpc(rpc.clone())
            .pos_config_id(1)
            .cache(cache.clone())
            .order(order.clone())
            .operator(operator.clone())
            .default_handler(handler.clone())
            .options(options);
        if let Some(classifier) = classifier {
            builder = builder.classifier(classifier);
        }
        let dispatcher = builder.build().unwrap();

        Self {
            dispatcher,
            rpc,
            operator,
            order,
            cache,
            handler,
        }
    }

    pub fn cache_products(&self, products: Vec<Product>) {
        self.cache.insert_products(products);
    }
}

//! Variant Scan - barcode-to-order resolution for a POS client
//!
//! When a scanned barcode is shared by several variants of one product
//! template, the cashier picks the exact variant before it is added to the
//! order.
//!
//! # Module layout
//!
//! ```text
//! variant-scan/src/
//! ├── core/        # Config, ScanError
//! ├── utils/       # logger
//! ├── catalog/     # product cache, template enrichment, shared-barcode catalog
//! ├── lookup/      # remote barcode lookup, payload resolver
//! ├── selection.rs # variant selection flow
//! ├── dispatch/    # classifier, dispatcher, builder
//! ├── operator.rs  # popup descriptions + OperatorPrompt
//! ├── order.rs     # OrderAppender + InMemoryOrder
//! └── terminal.rs  # stdin/stdout host
//! ```

pub mod catalog;
pub mod core;
pub mod dispatch;
pub mod lookup;
pub mod operator;
pub mod order;
pub mod selection;
pub mod terminal;
pub mod utils;

// Re-export public types
pub use catalog::{CatalogCache, CatalogError, LocalCatalog, ProductCache};
pub use core::{Config, ScanError, ScanResult};
pub use dispatch::{
    BarcodeClassifier, BarcodeKind, DefaultScanHandler, Nomenclature, ScanDispatcher,
    ScanDispatcherBuilder, ScanOptions, ScanOutcome,
};
pub use lookup::{CatalogRpc, VariantRemoteLookup, VariantResolver};
pub use operator::{ErrorPopup, OperatorPrompt, SelectionPopup};
pub use order::{InMemoryOrder, OrderAppender, OrderError};
pub use selection::{Selection, VariantSelectionFlow};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

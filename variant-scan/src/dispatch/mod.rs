//! Scan dispatch - classification, orchestration and startup wiring

pub mod builder;
pub mod classifier;
pub mod dispatcher;

pub use builder::ScanDispatcherBuilder;
pub use classifier::{BarcodeClassifier, BarcodeKind, BarcodeRule, Nomenclature};
pub use dispatcher::{DefaultScanHandler, PassThrough, ScanDispatcher, ScanOptions, ScanOutcome};

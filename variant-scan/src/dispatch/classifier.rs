//! Barcode nomenclature
//!
//! Decides what kind of code was scanned before any lookup happens. Only
//! `Product` codes go through the variant pipeline.

use std::fmt;

/// Kind of a scanned code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeKind {
    Product,
    Weight,
    Price,
    Discount,
    Client,
    Cashier,
    Lot,
    Package,
    /// Not a usable code
    Error,
}

impl BarcodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeKind::Product => "product",
            BarcodeKind::Weight => "weight",
            BarcodeKind::Price => "price",
            BarcodeKind::Discount => "discount",
            BarcodeKind::Client => "client",
            BarcodeKind::Cashier => "cashier",
            BarcodeKind::Lot => "lot",
            BarcodeKind::Package => "package",
            BarcodeKind::Error => "error",
        }
    }
}

impl fmt::Display for BarcodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host barcode classifier
pub trait BarcodeClassifier: Send + Sync {
    fn classify(&self, code: &str) -> BarcodeKind;
}

/// Prefix rule, optionally restricted to one code length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRule {
    pub kind: BarcodeKind,
    pub prefix: String,
    pub length: Option<usize>,
}

impl BarcodeRule {
    pub fn new(kind: BarcodeKind, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            length: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn matches(&self, code: &str) -> bool {
        code.starts_with(&self.prefix) && self.length.is_none_or(|len| code.len() == len)
    }
}

/// Ordered rule set, first matching rule wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nomenclature {
    rules: Vec<BarcodeRule>,
    /// Reject EAN-8/EAN-13 codes with a wrong check digit
    check_ean: bool,
}

impl Nomenclature {
    /// Rule set without any rule: every non-empty code is a product
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn new(rules: Vec<BarcodeRule>) -> Self {
        Self {
            rules,
            check_ean: false,
        }
    }

    /// Classify EAN-8/EAN-13 codes with a bad check digit as errors
    pub fn with_ean_check(mut self, enabled: bool) -> Self {
        self.check_ean = enabled;
        self
    }

    pub fn with_rule(mut self, rule: BarcodeRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[BarcodeRule] {
        &self.rules
    }
}

impl Default for Nomenclature {
    /// Embedded-price EAN-13 prefixes plus cashier and client cards
    fn default() -> Self {
        Self::new(vec![
            BarcodeRule::new(BarcodeKind::Weight, "21").with_length(13),
            BarcodeRule::new(BarcodeKind::Discount, "22").with_length(13),
            BarcodeRule::new(BarcodeKind::Price, "23").with_length(13),
            BarcodeRule::new(BarcodeKind::Cashier, "041"),
            BarcodeRule::new(BarcodeKind::Client, "042"),
        ])
    }
}

impl BarcodeClassifier for Nomenclature {
    fn classify(&self, code: &str) -> BarcodeKind {
        if code.is_empty() || code.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return BarcodeKind::Error;
        }
        if self.check_ean && !ean_check_digit_ok(code) {
            return BarcodeKind::Error;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(code))
            .map_or(BarcodeKind::Product, |rule| rule.kind)
    }
}

/// Check digit of an all-digit EAN-8/EAN-13 code
///
/// Codes of any other shape pass.
fn ean_check_digit_ok(code: &str) -> bool {
    if !matches!(code.len(), 8 | 13) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
    let (body, check) = digits.split_at(digits.len() - 1);
    // Weights alternate 3,1 starting from the digit next to the check digit
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == check[0]
}

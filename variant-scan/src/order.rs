//! Order appender
//!
//! The host order is opaque to the scan pipeline: a resolved product is
//! handed over and the order increments its quantity.

use std::sync::Arc;

use parking_lot::RwLock;
use shared::{Product, ProductId};
use thiserror::Error;

/// Order rejected the product
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("No order is open")]
    NoOpenOrder,
}

/// Host order
pub trait OrderAppender: Send + Sync {
    /// Add one unit of `product`
    fn add_product(&self, product: &Product) -> Result<(), OrderError>;
}

/// One order line
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product: Product,
    pub quantity: u32,
}

/// In-memory order, one line per product
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrder {
    lines: Arc<RwLock<Vec<OrderLine>>>,
}

impl InMemoryOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were first added
    pub fn lines(&self) -> Vec<OrderLine> {
        self.lines.read().clone()
    }

    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.lines
            .read()
            .iter()
            .find(|line| line.product.id == id)
            .map_or(0, |line| line.quantity)
    }

    /// Total units across all lines
    pub fn total_quantity(&self) -> u32 {
        self.lines.read().iter().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }
}

impl OrderAppender for InMemoryOrder {
    fn add_product(&self, product: &Product) -> Result<(), OrderError> {
        let mut lines = self.lines.write();
        match lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity += 1,
            None => lines.push(OrderLine {
                product: product.clone(),
                quantity: 1,
            }),
        }
        Ok(())
    }
}

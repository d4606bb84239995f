//! # Cart Engine
//!
//! Aggregates repeated product selections into quantity-tracked lines and
//! derives the running total.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Store Action             Engine Call              State Change         │
//! │  ────────────             ───────────              ────────────         │
//! │                                                                         │
//! │  "Add to Cart" ─────────► add_to_cart(p) ──┬────► line(p).qty += 1     │
//! │                                            │      (already in cart)     │
//! │                                            └────► lines.push(p, 1)     │
//! │                                                   (first add)           │
//! │                                                                         │
//! │  Cart panel ────────────► total() ──────────────► (read only)          │
//! │                                                                         │
//! │  Checkout button ───────► can_checkout() ───────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no removal, no quantity edit and no capacity limit: adding is a
//! total operation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, ProductId};

/// One aggregated (product, quantity) pair.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Shared handle into the catalog.
    #[ts(as = "Product")]
    pub product: Arc<Product>,

    /// Always >= 1.
    pub quantity: u32,
}

impl CartLine {
    fn new(product: Arc<Product>) -> Self {
        CartLine {
            product,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding the same product bumps quantity)
/// - Lines keep first-add order
/// - Quantities never decrease
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created (mount time).
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: its quantity goes up by one
    /// - Otherwise: a new line with quantity 1 is appended
    ///
    /// The caller guarantees the product comes from the catalog. Returns the
    /// affected line.
    pub fn add_to_cart(&mut self, product: Arc<Product>) -> &CartLine {
        let index = match self.position(product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.saturating_add(1);
                index
            }
            None => {
                self.lines.push(CartLine::new(product));
                self.lines.len() - 1
            }
        };

        &self.lines[index]
    }

    /// Σ(unit price × quantity) over all lines, in exact cents.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines in first-add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Quantity held for a product (0 if absent).
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.position(id).map_or(0, |i| self.lines[i].quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Checkout is offered only for a non-empty cart.
    pub fn can_checkout(&self) -> bool {
        !self.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product.id == id)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

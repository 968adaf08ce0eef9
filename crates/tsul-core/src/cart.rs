//! # Cart Engine
//!
//! Pure cart operations: merge-on-add, remove by index, clear, and receipt
//! computation. Persistence lives in `tsul-store`; this module only turns
//! one list of lines into the next one.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Page Action              Engine Call              Lines Change         │
//! │  ───────────              ───────────              ────────────         │
//! │                                                                         │
//! │  Add to Cart ────────────► add_item() ───┬──► lines[i].quantity += 1   │
//! │                                          │    (same name + size)        │
//! │                                          └──► lines.push(qty = 1)      │
//! │                                                                         │
//! │  Delete line ────────────► remove_item(i) ──► lines.remove(i)          │
//! │                                               (out of range: no-op)     │
//! │                                                                         │
//! │  Clear ──────────────────► clear() ─────────► lines = []               │
//! │                                                                         │
//! │  View cart / checkout ───► receipt() ───────► (read only)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Layout
//! The list is stored as one JSON array of
//! `{"name": .., "price": <decimal>, "size": .., "quantity": <int>}`.
//! There is no schema version: anything that does not decode cleanly is an
//! empty cart (see [`decode_lines`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CartLine, CartSummary, Receipt, TaxRate};
use crate::validation::{parse_price, require, validate_price, ValidationResult};

// =============================================================================
// Add Request
// =============================================================================

/// A validated add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemRequest {
    pub name: String,
    pub unit_price: Money,
    pub size: String,
}

impl AddItemRequest {
    /// Validates raw page input.
    ///
    /// ## Rules
    /// - `name` and `size` must be non-empty (trimmed)
    /// - `price` is coerced with [`parse_price`]
    ///
    /// ```rust
    /// use tsul_core::cart::AddItemRequest;
    ///
    /// let req = AddItemRequest::parse("TSUL Tee", "40", "M").unwrap();
    /// assert_eq!(req.unit_price.cents(), 4000);
    /// assert!(AddItemRequest::parse("TSUL Tee", "free", "M").is_err());
    /// ```
    pub fn parse(name: &str, price: &str, size: &str) -> ValidationResult<Self> {
        let name = require("name", name)?;
        let size = require("size", size)?;
        let unit_price = parse_price(price)?;
        Ok(AddItemRequest {
            name: name.to_string(),
            unit_price,
            size: size.to_string(),
        })
    }

    /// Builds a request from an already-typed price.
    pub fn new(name: &str, unit_price: Money, size: &str) -> ValidationResult<Self> {
        let name = require("name", name)?;
        let size = require("size", size)?;
        Ok(AddItemRequest {
            name: name.to_string(),
            unit_price,
            size: size.to_string(),
        })
    }
}

/// Result of an add: the line as it now stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub line: CartLine,

    /// Position of the line in the cart.
    pub index: usize,

    /// `true` when an existing line was incremented.
    pub merged: bool,
}

impl AddOutcome {
    /// Text of the transient "added" notification.
    pub fn notice(&self) -> String {
        format!("{} ({}) added to cart", self.line.name, self.line.size)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An ordered list of cart lines.
///
/// ## Invariants
/// - At most one line per `(name, size)`
/// - Every line has `quantity >= 1`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Wraps lines read from storage.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    /// The lines in order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consumes the cart, returning its lines.
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `(name, size)`.
    ///
    /// ## Behavior
    /// - Line with the same `(name, size)` exists: quantity + 1 (its frozen
    ///   price is kept)
    /// - Otherwise: a new line with quantity 1 is appended
    pub fn add_item(&mut self, request: AddItemRequest) -> AddOutcome {
        if let Some(index) = self
            .lines
            .iter()
            .position(|l| l.is_same_variant(&request.name, &request.size))
        {
            let line = &mut self.lines[index];
            line.quantity = line.quantity.saturating_add(1);
            return AddOutcome {
                line: line.clone(),
                index,
                merged: true,
            };
        }

        let line = CartLine::new(request.name, request.unit_price, request.size);
        self.lines.push(line.clone());
        AddOutcome {
            line,
            index: self.lines.len() - 1,
            merged: false,
        }
    }

    /// Removes the line at `index`; `None` when out of range.
    pub fn remove_item(&mut self, index: usize) -> Option<CartLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Counts for the cart badge.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self.lines.as_slice())
    }

    /// Computes the receipt for the current lines.
    pub fn receipt(&self, tax_rate: TaxRate, generated_at: DateTime<Utc>) -> Receipt {
        build_receipt(self.lines.clone(), tax_rate, generated_at)
    }
}

/// Computes subtotal, tax and total for `lines`.
///
/// ## Formulae
/// ```text
/// subtotal = Σ(unit_price × quantity)
/// tax      = round(subtotal × rate, 2)     (half-up, on cents)
/// total    = subtotal + tax                (already whole cents)
/// ```
pub fn build_receipt(
    lines: Vec<CartLine>,
    tax_rate: TaxRate,
    generated_at: DateTime<Utc>,
) -> Receipt {
    let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
    let tax = subtotal.calculate_tax(tax_rate);
    Receipt {
        lines,
        subtotal,
        tax_rate,
        tax,
        total: subtotal + tax,
        generated_at,
    }
}

// =============================================================================
// Stored Layout
// =============================================================================

/// Persisted shape of one line.
///
/// `quantity` may be missing in data written by older pages; it reads as 1.
#[derive(Debug, Serialize, Deserialize)]
struct StoredLine {
    name: String,
    price: f64,
    size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quantity: Option<i64>,
}

impl StoredLine {
    fn into_line(self) -> Option<CartLine> {
        let unit_price = validate_price(self.price).ok()?;
        let quantity = self.quantity.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
        Some(CartLine {
            name: self.name,
            unit_price,
            size: self.size,
            quantity,
        })
    }
}

impl From<&CartLine> for StoredLine {
    fn from(line: &CartLine) -> Self {
        StoredLine {
            name: line.name.clone(),
            price: line.unit_price.to_decimal(),
            size: line.size.clone(),
            quantity: Some(i64::from(line.quantity)),
        }
    }
}

/// Decodes the stored value.
///
/// Returns `None` when the value is not a JSON array of lines or any line
/// breaks an invariant that cannot be repaired (negative, non-finite or
/// over-ceiling price). Missing or zero quantities are repaired to 1. Duplicate
/// `(name, size)` pairs are folded into the first occurrence.
pub fn decode_lines(raw: &str) -> Option<Vec<CartLine>> {
    let stored: Vec<StoredLine> = serde_json::from_str(raw).ok()?;
    let mut cart = Cart::new();
    for entry in stored {
        let line = entry.into_line()?;
        match cart
            .lines
            .iter_mut()
            .find(|l| l.is_same_variant(&line.name, &line.size))
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity)
            }
            None => cart.lines.push(line),
        }
    }
    Some(cart.into_lines())
}

/// Encodes lines into the stored layout.
pub fn encode_lines(lines: &[CartLine]) -> serde_json::Result<String> {
    let stored: Vec<StoredLine> = lines.iter().map(StoredLine::from).collect();
    serde_json::to_string(&stored)
}

// =============================================================================
// Unit Tests
// =============================================================================

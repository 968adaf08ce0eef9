//! # Domain Types
//!
//! Core domain types shared by the cart engine and its callers.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │   │     Receipt     │   │   CartSummary   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name    ┐ key  │   │  lines          │   │  line_count     │       │
//! │  │  size    ┘      │   │  subtotal       │   │  total_quantity │       │
//! │  │  unit_price     │   │  tax_rate / tax │   └─────────────────┘       │
//! │  │  quantity ≥ 1   │   │  total          │                             │
//! │  └─────────────────┘   │  generated_at   │   ┌─────────────────┐       │
//! │                        └─────────────────┘   │    TaxRate      │       │
//! │                                              │  bps (u32)      │       │
//! │                                              │  825 = 8.25%    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! A cart line is identified by the pair `(name, size)`. Adding the same pair
//! again bumps `quantity`; it never creates a second line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25% (the storefront's fixed sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        crate::DEFAULT_TAX_RATE
    }
}

/// Renders as `8.25%`, trimming a trailing zero (`10%`, `7.5%`).
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}%", whole),
            f2 if f2 % 10 == 0 => write!(f, "{}.{}%", whole, f2 / 10),
            f2 => write!(f, "{}.{:02}%", whole, f2),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product/size/quantity record in the cart.
///
/// ## Invariants
/// - `quantity >= 1`
/// - `unit_price >= 0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product display name (half of the identity key).
    pub name: String,

    /// Unit price, frozen when the line was first added.
    pub unit_price: Money,

    /// Size variant (other half of the identity key).
    pub size: String,

    /// Cumulative quantity.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a fresh line with quantity 1.
    pub fn new(name: impl Into<String>, unit_price: Money, size: impl Into<String>) -> Self {
        CartLine {
            name: name.into(),
            unit_price,
            size: size.into(),
            quantity: 1,
        }
    }

    /// Whether this line is the merge target for `(name, size)`.
    #[inline]
    pub fn is_same_variant(&self, name: &str, size: &str) -> bool {
        self.name == name && self.size == size
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Derived summary of the cart. Never persisted; rebuilt on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Lines in persisted order.
    pub lines: Vec<CartLine>,

    /// Σ(unit_price × quantity)
    pub subtotal: Money,

    /// Rate applied to the subtotal.
    pub tax_rate: TaxRate,

    /// round(subtotal × rate, 2)
    pub tax: Money,

    /// subtotal + tax
    pub total: Money,

    /// When the receipt was computed.
    pub generated_at: DateTime<Utc>,
}

impl Receipt {
    /// Whether the receipt has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Counts for a cart badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub line_count: usize,
    pub total_quantity: u64,
}

impl From<&[CartLine]> for CartSummary {
    fn from(lines: &[CartLine]) -> Self {
        CartSummary {
            line_count: lines.len(),
            total_quantity: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert_eq!(TaxRate::from_percentage(-1.0).bps(), 0);
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(TaxRate::from_bps(750).to_string(), "7.5%");
        assert_eq!(TaxRate::from_bps(1000).to_string(), "10%");
        assert_eq!(TaxRate::zero().to_string(), "0%");
    }

    #[test]
    fn test_cart_line_total() {
        let mut line = CartLine::new("TSUL Tee", Money::from_cents(4000), "M");
        assert_eq!(line.quantity, 1);
        line.quantity = 3;
        assert_eq!(line.line_total().cents(), 12000);
        assert!(line.is_same_variant("TSUL Tee", "M"));
        assert!(!line.is_same_variant("TSUL Tee", "L"));
    }

    #[test]
    fn test_summary_counts() {
        let mut a = CartLine::new("Hoodie", Money::from_cents(4000), "M");
        a.quantity = 2;
        let b = CartLine::new("Tee", Money::from_cents(4000), "S");
        let summary = CartSummary::from(&[a, b][..]);
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.total_quantity, 3);
    }
}

//! # tsul-core: Pure Storefront Logic for TSUL
//!
//! Everything in the storefront that has a real invariant lives here, as
//! plain functions and data with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TSUL Storefront                                  │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tsul-storefront (application)                   │   │
//! │  │   config • runtime (commands) • debouncer • frame clock        │   │
//! │  │   renderers • notices • account flow                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tsul-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │   cart   │ │  search  │ │ particle │ │  color   │         │   │
//! │  │   │  merge   │ │  rank    │ │ physics  │ │  shade   │         │   │
//! │  │   │ receipt  │ │  filter  │ │ lifecycle│ │  accent  │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │   money • types • catalog • validation • error                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO TIMERS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tsul-store (persistence)                        │   │
//! │  │          key-value slot, persisted cart, migrations             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Merge-on-add, remove, clear, receipt; stored layout codec
//! - [`search`] - Ranked search, type-ahead and section filters
//! - [`particle`] - Gumball physics and opacity lifecycle
//! - [`color`] - `#RRGGBB` shading and the accent cycle
//! - [`catalog`] - Built-in products and the product-page lookup
//! - [`money`] / [`types`] - Integer cents, tax rate, cart line, receipt
//! - [`validation`] / [`error`] - Input rules and error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tsul_core::cart::{AddItemRequest, Cart};
//! use tsul_core::DEFAULT_TAX_RATE;
//!
//! let mut cart = Cart::new();
//! cart.add_item(AddItemRequest::parse("TSUL Hoodie", "40", "M").unwrap());
//! cart.add_item(AddItemRequest::parse("TSUL Hoodie", "40", "M").unwrap());
//!
//! let receipt = cart.receipt(DEFAULT_TAX_RATE, chrono::Utc::now());
//! assert_eq!(receipt.subtotal.cents(), 8000);
//! assert_eq!(receipt.tax.cents(), 660);
//! assert_eq!(receipt.total.cents(), 8660);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod color;
pub mod error;
pub mod money;
pub mod particle;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddItemRequest, AddOutcome, Cart};
pub use catalog::{Catalog, Product, ProductLookup};
pub use color::{AccentCycle, Rgb, PALETTE};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use particle::{Particle, ParticleEngine, Phase, Sprite};
pub use search::{ItemId, MatchKind, SearchItem, SearchMatch};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax applied to every receipt (8.25%).
pub const DEFAULT_TAX_RATE: TaxRate = TaxRate::from_bps(825);

/// Well-known key of the persisted cart slot.
pub const CART_STORAGE_KEY: &str = "tsulCart";

/// Title printed at the top of every receipt.
pub const RECEIPT_TITLE: &str = "TSUL Fall/Holiday 2025 Receipt";

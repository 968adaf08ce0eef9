//! # Persisted Cart
//!
//! [`CartStore`] wraps the pure [`Cart`] engine around one durable slot.
//! Every mutation is read-modify-write of the whole slot.
//!
//! ## Operation Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item / remove_item / clear                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get("tsulCart") ──► decode ──┬── ok ──────────► Cart                   │
//! │                               └── absent/bad ──► Cart::new()  (warn)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pure Cart operation                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  set("tsulCart", encode(lines))     (skipped when nothing changed)      │
//! │                                                                         │
//! │  receipt / summary: read + decode only, never write                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Within one process the runtime applies commands one at a time, so cycles
//! never overlap. Two processes sharing a database file are NOT coordinated:
//! both can read the same value and the later write wins, dropping the other
//! update. No cross-process lock is taken.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tsul_core::cart::{decode_lines, encode_lines, AddItemRequest, AddOutcome, Cart};
use tsul_core::{CartLine, CartSummary, Receipt, TaxRate, CART_STORAGE_KEY, DEFAULT_TAX_RATE};

use crate::error::StoreResult;
use crate::kv::KeyValueStore;

/// The persisted cart.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    store: S,
    key: String,
    tax_rate: TaxRate,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Cart under the default key, taxed at the default rate.
    pub fn new(store: S) -> Self {
        CartStore {
            store,
            key: CART_STORAGE_KEY.to_string(),
            tax_rate: DEFAULT_TAX_RATE,
        }
    }

    /// Uses a different slot key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Uses a different tax rate for receipts.
    pub fn with_tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Reads the current cart. Absent or unreadable values are an empty cart.
    pub async fn load(&self) -> StoreResult<Cart> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Cart::new());
        };

        match decode_lines(&raw) {
            Some(lines) => Ok(Cart::from_lines(lines)),
            None => {
                warn!(
                    key = %self.key,
                    bytes = raw.len(),
                    "Stored cart is unreadable, treating as empty"
                );
                Ok(Cart::new())
            }
        }
    }

    async fn save(&self, cart: &Cart) -> StoreResult<()> {
        let raw = encode_lines(cart.lines())?;
        self.store.set(&self.key, &raw).await
    }

    /// Adds one unit of the requested variant.
    pub async fn add_item(&self, request: AddItemRequest) -> StoreResult<AddOutcome> {
        let mut cart = self.load().await?;
        let outcome = cart.add_item(request);
        self.save(&cart).await?;

        debug!(
            name = %outcome.line.name,
            size = %outcome.line.size,
            quantity = outcome.line.quantity,
            merged = outcome.merged,
            "Cart line added"
        );
        Ok(outcome)
    }

    /// Removes the line at `index`. Out of range leaves the slot untouched.
    pub async fn remove_item(&self, index: usize) -> StoreResult<Option<CartLine>> {
        let mut cart = self.load().await?;
        let removed = cart.remove_item(index);

        match &removed {
            Some(line) => {
                self.save(&cart).await?;
                debug!(index, name = %line.name, size = %line.size, "Cart line removed");
            }
            None => debug!(index, lines = cart.lines().len(), "Remove ignored, index out of range"),
        }
        Ok(removed)
    }

    /// Empties the cart (writes an empty list).
    pub async fn clear(&self) -> StoreResult<()> {
        self.save(&Cart::new()).await?;
        debug!("Cart cleared");
        Ok(())
    }

    /// Receipt stamped with the current time.
    pub async fn receipt(&self) -> StoreResult<Receipt> {
        self.receipt_at(Utc::now()).await
    }

    /// Receipt stamped with `generated_at`. Reads only.
    pub async fn receipt_at(&self, generated_at: DateTime<Utc>) -> StoreResult<Receipt> {
        Ok(self.load().await?.receipt(self.tax_rate, generated_at))
    }

    /// Line and unit counts.
    pub async fn summary(&self) -> StoreResult<CartSummary> {
        Ok(self.load().await?.summary())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

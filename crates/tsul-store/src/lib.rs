//! # tsul-store: Persistence Layer for the TSUL Storefront
//!
//! Durable key-value slots and the persisted cart built on them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Runtime command (AddItem, RemoveItem, ClearCart, ShowCart)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tsul-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  CartStore    │───►│ KeyValueStore │    │  Migrations  │  │   │
//! │  │   │ (cart_store)  │    │    (kv.rs)    │    │  (embedded)  │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │ pure math          │                               │   │
//! │  │           ▼                    ▼                               │   │
//! │  │      tsul-core::cart     SqliteStore / MemoryStore             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir)/storefront.db  ── table kv_store      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tsul_store::{CartStore, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let carts = CartStore::new(db.kv());
//! let receipt = carts.receipt().await?;
//! ```

pub mod cart_store;
pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;

pub use cart_store::CartStore;
pub use error::{StoreError, StoreResult};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use pool::{Database, DbConfig};

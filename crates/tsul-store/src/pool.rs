//! # SQLite Pool
//!
//! Opens the file (or in-memory) database behind [`SqliteStore`].
//!
//! ```text
//! DbConfig::new(path) / DbConfig::in_memory()
//!        │
//!        ▼
//! Database::new ── connect (WAL) ── migrate ──► Database
//!        │
//!        ├── kv()    ──► SqliteStore ──► CartStore
//!        └── close() ◄── RuntimeHandle::shutdown
//! ```
//!
//! Two storefront processes may open the same file. WAL keeps their reads
//! from blocking each other; it does not serialize their read-modify-write
//! cycles (see [`crate::cart_store`]).

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::kv::SqliteStore;
use crate::migrations;

/// Where and how to open the slot database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `None` for a private in-memory database.
    pub path: Option<PathBuf>,
    /// Pool size. A single writer is all the cart needs.
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Apply embedded migrations after connecting.
    pub migrate: bool,
}

impl DbConfig {
    /// File database at `path`; the file is created when missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: Some(path.into()),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(10),
            migrate: true,
        }
    }

    /// Private in-memory database, gone when the pool closes.
    pub fn in_memory() -> Self {
        DbConfig {
            path: None,
            // every connection would otherwise see its own empty database
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            None => SqliteConnectOptions::new().in_memory(true),
        };
        options.synchronous(SqliteSynchronous::Normal)
    }
}

/// An open slot database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, migrates.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        let location = config
            .path
            .as_deref()
            .map_or_else(|| ":memory:".to_string(), |p: &Path| p.display().to_string());
        info!(%location, "Opening slot database");

        let mut pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);
        if config.is_in_memory() {
            // the database dies with its last connection
            pool = pool.min_connections(1).idle_timeout(None).max_lifetime(None);
        }

        let pool = pool
            .connect_with(config.connect_options())
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("{}: {}", location, e)))?;
        debug!(max_connections = config.max_connections, "Pool connected");

        if config.migrate {
            migrations::run_migrations(&pool).await?;
        }
        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Key-value slot store over this database.
    pub fn kv(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    /// Closes the pool. Later operations fail with [`StoreError::Closed`].
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Slot database closed");
    }

    /// Whether the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

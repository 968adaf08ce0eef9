//! # Application Context
//!
//! Everything the page used to keep in globals (current cart, accent color,
//! particle pool) lives in one [`AppContext`], built once at startup and
//! owned by the runtime task.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  StorefrontConfig::load_or_default()                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppContext::init(config, identity)                                     │
//! │       │  1. open SQLite (or memory) slot store, run migrations          │
//! │       │  2. CartStore over the slot, configured key + tax rate          │
//! │       │  3. Catalog + search corpus                                      │
//! │       │  4. AccentCycle + ParticleEngine from the palette               │
//! │       ▼                                                                 │
//! │  Runtime::spawn(ctx, sink, surface) ──► RuntimeHandle                   │
//! │       .                                                                 │
//! │       .   commands, debounced searches, frames, auth changes            │
//! │       ▼                                                                 │
//! │  RuntimeHandle::shutdown() ──► AppContext::close() ──► pool closed      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

use tsul_core::{AccentCycle, Catalog, ParticleEngine, SearchItem};
use tsul_store::{CartStore, Database, DbConfig, KeyValueStore, MemoryStore};

use crate::account::AccountFlow;
use crate::config::StorefrontConfig;
use crate::error::AppResult;
use crate::identity::IdentityBackend;

/// The persisted cart as the app uses it.
pub type AppCartStore = CartStore<Arc<dyn KeyValueStore>>;

/// Application state owned by the runtime.
pub struct AppContext {
    pub config: Arc<StorefrontConfig>,
    pub cart: AppCartStore,
    pub catalog: Catalog,
    /// Items the search box and filters look at.
    pub corpus: Vec<SearchItem>,
    pub accent: AccentCycle,
    /// `None` when the animation is disabled.
    pub particles: Option<ParticleEngine>,
    pub account: AccountFlow,
    epoch: Instant,
    db: Option<Database>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("storage_key", &self.cart.key())
            .field("products", &self.catalog.products().len())
            .field("accent", &self.accent.current())
            .field("particles", &self.particles.as_ref().map(|p| p.particles().len()))
            .field("persistent", &self.db.is_some())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Opens storage according to `config` and builds the context.
    pub async fn init(
        config: StorefrontConfig,
        identity: Arc<dyn IdentityBackend>,
    ) -> AppResult<Self> {
        let db_config = match config.database_path() {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                info!(?path, "Opening storefront database");
                DbConfig::new(path)
            }
            None => {
                info!("Using in-memory storefront database");
                DbConfig::in_memory()
            }
        };

        let db = Database::new(db_config).await?;
        if !db.health_check().await {
            warn!("Storefront database opened but does not answer queries");
        }
        let kv: Arc<dyn KeyValueStore> = Arc::new(db.kv());
        AppContext::new(config, kv, identity, Some(db))
    }

    /// Context over an in-process store (tests, throwaway sessions).
    pub fn in_memory(
        config: StorefrontConfig,
        identity: Arc<dyn IdentityBackend>,
    ) -> AppResult<Self> {
        AppContext::new(config, Arc::new(MemoryStore::new()), identity, None)
    }

    /// Builds the context over an already-open slot store.
    pub fn new(
        config: StorefrontConfig,
        kv: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityBackend>,
        db: Option<Database>,
    ) -> AppResult<Self> {
        config.validate()?;

        let cart = CartStore::new(kv)
            .with_key(config.cart.storage_key.clone())
            .with_tax_rate(config.cart.tax_rate());

        let catalog = Catalog::builtin();
        let corpus = catalog.search_corpus();
        let accent = AccentCycle::new(config.animation.palette.clone())?;

        let anim = &config.animation;
        let particles = if anim.enabled && anim.particle_count > 0 {
            let mut rng = rand::rng();
            Some(ParticleEngine::initialize(
                anim.width,
                anim.height,
                anim.particle_count,
                &anim.palette,
                &mut rng,
                0.0,
            )?)
        } else {
            None
        };

        info!(
            products = catalog.products().len(),
            particles = particles.as_ref().map_or(0, |p| p.particles().len()),
            storage_key = %cart.key(),
            "Storefront context ready"
        );

        Ok(AppContext {
            config: Arc::new(config),
            cart,
            catalog,
            corpus,
            accent,
            particles,
            account: AccountFlow::new(identity),
            epoch: Instant::now(),
            db,
        })
    }

    /// Milliseconds since the context was built (the particle clock).
    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// Releases storage. The cart store fails after this.
    pub async fn close(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
        info!("Storefront context closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LocalIdentity;

    fn identity() -> Arc<dyn IdentityBackend> {
        Arc::new(LocalIdentity::new())
    }

    #[tokio::test]
    async fn test_init_in_memory_sqlite() {
        let mut config = StorefrontConfig::default();
        config.storage.in_memory = true;
        config.animation.particle_count = 5;

        let ctx = AppContext::init(config, identity()).await.unwrap();
        assert!(ctx.database().is_some());
        assert_eq!(ctx.particles.as_ref().unwrap().particles().len(), 5);
        assert_eq!(ctx.corpus.len(), ctx.catalog.products().len());
        assert!(ctx.cart.receipt().await.unwrap().is_empty());

        ctx.close().await;
        assert!(ctx.cart.receipt().await.is_err());
    }

    #[tokio::test]
    async fn test_animation_disabled() {
        let mut config = StorefrontConfig::default();
        config.animation.enabled = false;
        let ctx = AppContext::in_memory(config, identity()).unwrap();
        assert!(ctx.particles.is_none());
    }

    #[tokio::test]
    async fn test_config_flows_into_cart_store() {
        let mut config = StorefrontConfig::default();
        config.cart.storage_key = "otherCart".to_string();
        config.cart.tax_rate_bps = 0;
        let ctx = AppContext::in_memory(config, identity()).unwrap();
        assert_eq!(ctx.cart.key(), "otherCart");
        assert_eq!(ctx.cart.tax_rate().bps(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = StorefrontConfig::default();
        config.animation.palette.clear();
        assert!(AppContext::in_memory(config, identity()).is_err());
    }
}

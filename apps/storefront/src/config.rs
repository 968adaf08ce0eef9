//! # Storefront Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TSUL_DB_PATH=/tmp/storefront.db                                     │
//! │     TSUL_TAX_RATE=8.25                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $TSUL_CONFIG, or                                                    │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.tsul.storefront/storefront.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     tsulCart, 8.25%, 300 ms debounce, 80 particles                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "TSUL"
//! receipt_title = "TSUL Fall/Holiday 2025 Receipt"
//!
//! [cart]
//! storage_key = "tsulCart"
//! tax_rate_bps = 825
//! notice_ms = 3000
//!
//! [search]
//! debounce_ms = 300
//! fallback_section = "men"
//!
//! [animation]
//! enabled = true
//! particle_count = 80
//! width = 1280.0
//! height = 720.0
//! frame_interval_ms = 16
//! palette = ["#3082ff", "#c77dff", "#5ef08f", "#ff8c42", "#ff4a64"]
//!
//! [storage]
//! in_memory = false
//! # database_path = "/var/lib/tsul/storefront.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use tsul_core::catalog::COLLECTION_SECTION;
use tsul_core::particle::DEFAULT_PARTICLE_COUNT;
use tsul_core::{Rgb, TaxRate, CART_STORAGE_KEY, DEFAULT_TAX_RATE, PALETTE, RECEIPT_TITLE};

use crate::error::{AppError, AppResult, DEFAULT_NOTICE_MS};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TSUL_CONFIG";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

// =============================================================================
// Sections
// =============================================================================

/// Store identity shown on the page and the receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Title centered at the top of the receipt.
    #[serde(default = "default_receipt_title")]
    pub receipt_title: String,
}

fn default_store_name() -> String {
    "TSUL".to_string()
}

fn default_receipt_title() -> String {
    RECEIPT_TITLE.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            receipt_title: default_receipt_title(),
        }
    }
}

/// Cart persistence and receipt settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSettings {
    /// Slot key the cart is persisted under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Sales tax in basis points (825 = 8.25%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    /// How long cart notices stay up.
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE.bps()
}

fn default_notice_ms() -> u64 {
    DEFAULT_NOTICE_MS
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            storage_key: default_storage_key(),
            tax_rate_bps: default_tax_rate_bps(),
            notice_ms: default_notice_ms(),
        }
    }
}

impl CartSettings {
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

/// Search box behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before results render.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Section the Enter-key filter falls back to.
    #[serde(default = "default_fallback_section")]
    pub fallback_section: String,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_fallback_section() -> String {
    COLLECTION_SECTION.to_string()
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce_ms(),
            fallback_section: default_fallback_section(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Background particle animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_particle_count")]
    pub particle_count: usize,

    /// Initial canvas size in pixels.
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    /// Frame clock period. 16 ms is roughly one display refresh.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Colors particles are drawn in; also the click accent cycle.
    #[serde(default = "default_palette")]
    pub palette: Vec<Rgb>,
}

fn default_true() -> bool {
    true
}

fn default_particle_count() -> usize {
    DEFAULT_PARTICLE_COUNT
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    720.0
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_palette() -> Vec<Rgb> {
    PALETTE.to_vec()
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            enabled: true,
            particle_count: default_particle_count(),
            width: default_width(),
            height: default_height(),
            frame_interval_ms: default_frame_interval_ms(),
            palette: default_palette(),
        }
    }
}

impl AnimationSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Where the cart slot lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. `None` means the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Keep the cart in memory only (nothing survives exit).
    #[serde(default)]
    pub in_memory: bool,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub animation: AnimationSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, `$TSUL_CONFIG`, or the platform path)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let path = config_path
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        Self::load_from(path, |key| std::env::var(key).ok())
    }

    fn load_from<F>(path: Option<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> AppResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.cart.storage_key.trim().is_empty() {
            return Err(AppError::Config("cart.storage_key must not be empty".into()));
        }

        if self.cart.tax_rate_bps > 10_000 {
            return Err(AppError::Config(format!(
                "cart.tax_rate_bps must be at most 10000, got {}",
                self.cart.tax_rate_bps
            )));
        }

        if self.animation.palette.is_empty() {
            return Err(AppError::Config("animation.palette must not be empty".into()));
        }

        if self.animation.frame_interval_ms == 0 {
            return Err(AppError::Config(
                "animation.frame_interval_ms must be greater than 0".into(),
            ));
        }

        let (w, h) = (self.animation.width, self.animation.height);
        if !(w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0) {
            return Err(AppError::Config(format!(
                "animation size must be finite and non-negative, got {}x{}",
                w, h
            )));
        }

        Ok(())
    }

    /// Applies `TSUL_*` overrides read through `lookup`.
    ///
    /// Unparsable or out-of-range values are ignored with a warning, so a bad
    /// variable never fails validation and discards the file settings.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TSUL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            if path == ":memory:" {
                self.storage.in_memory = true;
            } else {
                self.storage.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(name) = lookup("TSUL_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(rate) = lookup("TSUL_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if pct.is_finite() && (0.0..=100.0).contains(&pct) => {
                    debug!(rate = pct, "Overriding tax rate from environment");
                    self.cart.tax_rate_bps = TaxRate::from_percentage(pct).bps();
                }
                _ => warn!(rate = %rate, "Ignoring invalid TSUL_TAX_RATE"),
            }
        }

        if let Some(ms) = lookup("TSUL_DEBOUNCE_MS") {
            match ms.trim().parse::<u64>() {
                Ok(ms) => self.search.debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring invalid TSUL_DEBOUNCE_MS"),
            }
        }

        if let Some(count) = lookup("TSUL_PARTICLES") {
            match count.trim().parse::<usize>() {
                Ok(count) => {
                    self.animation.particle_count = count;
                    self.animation.enabled = count > 0;
                }
                Err(_) => warn!(value = %count, "Ignoring invalid TSUL_PARTICLES"),
            }
        }
    }

    /// Default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Database file to open, unless the cart lives in memory.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.storage.in_memory {
            return None;
        }
        self.storage
            .database_path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("storefront.db")))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "tsul", "storefront")
}

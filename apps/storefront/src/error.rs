//! # Application Errors and Notices
//!
//! Nothing a command does may take the page down. Every failure ends as a
//! [`Notice`]: a transient message with a level and a display duration.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Command handler                                                        │
//! │  AppResult<T>                                                           │
//! │       │                                                                 │
//! │       ├── ValidationError ───► AppError::Validation ──► Notice(Error)  │
//! │       │     "price must be a number, got 'abc'"                         │
//! │       │                                                                 │
//! │       ├── StoreError ────────► AppError::Store ──────► Notice(Error)   │
//! │       │     logged, generic text shown                                  │
//! │       │                                                                 │
//! │       ├── IdentityError ─────► AppError::Identity ───► Notice(Error)   │
//! │       │     "Login error: <backend message>" (verbatim)                 │
//! │       │                                                                 │
//! │       └── Ok(T) ─────────────► UiEvents                                 │
//! │                                                                         │
//! │  Corrupted cart data never gets here (self-heals in tsul-store).       │
//! │  Unknown product never gets here (inline "Product not found.").        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::error;

use tsul_core::{CoreError, ValidationError};
use tsul_store::StoreError;

use crate::identity::IdentityError;

/// How long a notice stays up unless a command says otherwise.
pub const DEFAULT_NOTICE_MS: u64 = 3000;

/// Account messages stay up longer.
pub const ACCOUNT_NOTICE_MS: u64 = 5000;

// =============================================================================
// Notice
// =============================================================================

/// Severity of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// A transient message shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration_ms: u64,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
            duration_ms: DEFAULT_NOTICE_MS,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Info, message)
    }

    /// Overrides the display duration.
    pub fn lasting(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

// =============================================================================
// AppError
// =============================================================================

/// Which account operation an identity failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    SignUp,
    SignIn,
    SignOut,
    Verify,
}

impl AccountAction {
    /// Prefix shown before the backend's message.
    pub fn prefix(&self) -> &'static str {
        match self {
            AccountAction::SignUp => "Sign-up error",
            AccountAction::SignIn => "Login error",
            AccountAction::SignOut => "Sign-out error",
            AccountAction::Verify => "Verification failed",
        }
    }
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before anything was mutated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(CoreError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Identity backend failure, shown verbatim after a prefix.
    #[error("{}: {source}", action.prefix())]
    Identity {
        action: AccountAction,
        source: IdentityError,
    },

    /// Account form rejected before reaching the backend.
    #[error("{0}")]
    Account(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write config file: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime task is gone (shut down or panicked).
    #[error("Runtime is not running")]
    RuntimeStopped,
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => AppError::Validation(v),
            other => AppError::Core(other),
        }
    }
}

impl AppError {
    pub fn identity(action: AccountAction, source: IdentityError) -> Self {
        AppError::Identity { action, source }
    }

    /// The notice shown for this error.
    ///
    /// ## Mapping
    /// ```text
    /// Validation  → Error, the validation message
    /// Identity    → Error, "<prefix>: <backend message>", 5 s
    /// Account     → Error, the form message, 5 s
    /// Store       → Error, generic text (details go to the log)
    /// Others      → Error, generic text (details go to the log)
    /// ```
    pub fn notice(&self) -> Notice {
        match self {
            AppError::Validation(e) => Notice::error(e.to_string()),
            AppError::Identity { .. } | AppError::Account(_) => {
                Notice::error(self.to_string()).lasting(ACCOUNT_NOTICE_MS)
            }
            AppError::Store(e) => {
                error!(error = %e, "Storage operation failed");
                Notice::error("Your cart could not be saved. Please try again.")
            }
            other => {
                error!(error = %other, "Command failed");
                Notice::error("Something went wrong. Please try again.")
            }
        }
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

//! # Error Types
//!
//! ```text
//! ValidationError ──► CoreError ──► AppError ──► Notice (what the page shows)
//!                                      ▲
//!                      StoreError ─────┘
//! ```
//!
//! Unreadable persisted cart data has no variant here: it reads as an empty
//! cart. An unknown product has none either; lookups return
//! [`crate::ProductLookup::NotFound`].

use thiserror::Error;

/// Failures of the pure engines.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    /// Particles and the accent cycle need at least one color.
    #[error("Palette must contain at least one color")]
    EmptyPalette,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Rejected shopper input. Nothing is mutated when one of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Prices that do not parse (`"forty"`, `"NaN"`).
    #[error("{field} must be a number, got '{value}'")]
    NotNumeric { field: String, value: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// e.g. a size outside S / M / L.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;

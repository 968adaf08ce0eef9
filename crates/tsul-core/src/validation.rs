//! # Validation Module
//!
//! Input validation for cart and account operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Page (HTML inputs)                                           │
//! │  └── Whatever the browser lets through                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Coerce "40" / "$40.00" into Money                                 │
//! │  ├── Required name / size / email / password                           │
//! │  └── Failure → transient message, nothing mutated                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart engine                                                  │
//! │  └── Only ever sees validated values                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::{Money, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted by the identity backend.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is present and returns it trimmed.
///
/// ```rust
/// use tsul_core::validation::require;
///
/// assert_eq!(require("size", "  M ").unwrap(), "M");
/// assert!(require("size", "   ").is_err());
/// ```
pub fn require<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with text on both sides
///
/// Anything stricter is left to the identity backend, whose message is shown
/// verbatim.
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let email = require("email", email)?;
    let mut parts = email.split('@');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    );
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }
    Ok(email)
}

/// Validates a new password (sign-up only).
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(password)
}

/// Validates that `value` is one of `allowed` (exact match).
pub fn validate_one_of<'a>(
    field: &str,
    value: &'a str,
    allowed: &[&str],
) -> ValidationResult<&'a str> {
    if allowed.contains(&value) {
        return Ok(value);
    }
    Err(ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Coerces a price typed or scraped from the page into `Money`.
///
/// ## Rules
/// - Surrounding whitespace and one leading `$` are ignored
/// - Must parse as a finite decimal
/// - Must be non-negative (zero is allowed: free items)
/// - Rounded to the nearest cent, at most [`MAX_PRICE_CENTS`]
///
/// ```rust
/// use tsul_core::validation::parse_price;
///
/// assert_eq!(parse_price("40").unwrap().cents(), 4000);
/// assert_eq!(parse_price(" $39.99 ").unwrap().cents(), 3999);
/// assert!(parse_price("forty").is_err());
/// assert!(parse_price("-1").is_err());
/// ```
pub fn parse_price(input: &str) -> ValidationResult<Money> {
    let trimmed = require("price", input)?;
    let numeric = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();

    let not_numeric = || ValidationError::NotNumeric {
        field: "price".to_string(),
        value: trimmed.to_string(),
    };

    let amount: f64 = numeric.parse().map_err(|_| not_numeric())?;
    validate_price(amount).map_err(|e| match e {
        ValidationError::NotNumeric { .. } => not_numeric(),
        other => other,
    })
}

/// Validates an already-numeric price.
pub fn validate_price(amount: f64) -> ValidationResult<Money> {
    if amount.is_sign_negative() && amount != 0.0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    let price = Money::from_decimal(amount).ok_or_else(|| ValidationError::NotNumeric {
        field: "price".to_string(),
        value: amount.to_string(),
    })?;
    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: Money::from_cents(MAX_PRICE_CENTS).to_string(),
        });
    }
    Ok(price)
}

// =============================================================================
// Unit Tests
// =============================================================================

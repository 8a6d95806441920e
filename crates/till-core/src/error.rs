//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule rejections (no side effects)      │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  till-db errors (separate crate)                                        │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── CheckoutError    - Rejected(CoreError) | CommitFailed(DbError)     │
//! │                                                                         │
//! │  till-notify errors (separate crate)                                    │
//! │  └── NotifyError      - Never escalated into a commit failure           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → register CLI       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Not An Error: Insufficient Change
//! A till that cannot return the full balance still completes the bill. The
//! shortfall is recorded on the bill (`change_shortfall`) and logged.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is detected before the atomic write step, so a caller that
/// receives one knows nothing was persisted.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request itself is malformed (customer email, empty cart, bad
    /// denomination counts, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// No product with this code exists.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough stock to complete the cart.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: RICE-5KG × 3, RICE-5KG × 2
    ///      │
    ///      ▼
    /// Check stock (cumulative): available=4, requested=5
    ///      │
    ///      ▼
    /// OutOfStock { code: "RICE-5KG", available: 4, requested: 5 }
    ///      │
    ///      ▼
    /// Whole cart aborted, nothing written
    /// ```
    #[error("Out of stock for {code}: available {available}, requested {requested}")]
    OutOfStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Quantity is zero or negative.
    ///
    /// Returned by the single-line pricer. Cart pricing drops such lines
    /// instead of failing.
    #[error("Invalid quantity {quantity} for {code}")]
    InvalidQuantity { code: String, quantity: i64 },

    /// No priceable line is left in the cart.
    #[error("Cart has no items with a positive quantity")]
    EmptyCart,

    /// A line or bill total does not fit in the money range.
    #[error("Amount too large for {context}")]
    AmountTooLarge { context: String },

    /// Cash tendered is less than the rounded bill total.
    #[error("Insufficient payment: required {required}, tendered {tendered}")]
    InsufficientPayment { required: Money, tendered: Money },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, bad amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., a denomination listed twice).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OutOfStock {
            code: "RICE-5KG".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock for RICE-5KG: available 3, requested 5"
        );

        let err = CoreError::InsufficientPayment {
            required: Money::from_rupees(2357),
            tendered: Money::from_paise(200_050),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: required 2357.00, tendered 2000.50"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_email".to_string(),
        };
        assert_eq!(err.to_string(), "customer_email is required");

        let err = ValidationError::Duplicate {
            field: "denomination".to_string(),
            value: "500".to_string(),
        };
        assert_eq!(err.to_string(), "denomination '500' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "cart".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidRequest(_)));
    }
}

//! # Validation Module
//!
//! Input validation utilities for Till.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request parsing (register CLI)                                │
//! │  ├── JSON shape, decimal amounts                                        │
//! │  └── Immediate operator feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout (Rust)                                               │
//! │  └── THIS MODULE: email, cart size, codes, denominations                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (available_stock >= 0), CHECK (count_available >= 0)         │
//! │  ├── UNIQUE constraints                                                 │
//! │  └── Foreign key constraints (RESTRICT on products)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_customer_email, validate_product_code};
//!
//! validate_customer_email("asha@example.in").unwrap();
//! validate_product_code("RICE-5KG").unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::CartLine;
use crate::MAX_CART_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest address accepted by SMTP (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

// =============================================================================
// String Validators
// =============================================================================

/// Validates the customer identifier, an email-shaped string.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 254 characters, no whitespace
/// - Exactly one `@` with a non-empty local part
/// - The domain has a dot that is neither first nor last
///
/// This is a shape check, not deliverability.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_customer_email;
///
/// assert!(validate_customer_email("asha@example.in").is_ok());
/// assert!(validate_customer_email("asha@localhost").is_err());
/// assert!(validate_customer_email("").is_err());
/// ```
pub fn validate_customer_email(email: &str) -> ValidationResult<()> {
    let field = "customer_email";
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid("must contain '@'")),
    };

    if local.is_empty() {
        return Err(invalid("missing the part before '@'"));
    }

    if domain.contains('@') {
        return Err(invalid("must contain exactly one '@'"));
    }

    let dotted = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < domain.len() - 1);
    if !dotted {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(())
}

/// Validates a product code (the business key).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_product_code;
///
/// assert!(validate_product_code("RICE-5KG").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "product_code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "product_code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "product_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in paise.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_price_paise;
///
/// assert!(validate_price_paise(10_000).is_ok()); // ₹100.00
/// assert!(validate_price_paise(0).is_ok());
/// assert!(validate_price_paise(-100).is_err());
/// ```
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a stock level (non-negative).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "available_stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a denomination value (positive whole rupees).
pub fn validate_denomination_value(value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "denomination".to_string(),
        });
    }

    Ok(())
}

/// Validates a denomination count (non-negative).
pub fn validate_denomination_count(count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::OutOfRange {
            field: "denomination count".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a cart before pricing.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CART_LINES (100) lines
/// - Every product code well-formed
///
/// Quantities are NOT checked here: the pricer drops non-positive lines.
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "cart".to_string(),
        });
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    for line in lines {
        validate_product_code(&line.product_code)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_customer_email() {
        // Valid
        assert!(validate_customer_email("asha@example.in").is_ok());
        assert!(validate_customer_email("  ravi.k+bills@mail.shop.co.in ").is_ok());

        // Invalid
        assert!(matches!(
            validate_customer_email("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_customer_email("asha").is_err());
        assert!(validate_customer_email("@example.in").is_err());
        assert!(validate_customer_email("asha@@example.in").is_err());
        assert!(validate_customer_email("asha@example").is_err());
        assert!(validate_customer_email("asha@.in").is_err());
        assert!(validate_customer_email("asha@example.").is_err());
        assert!(validate_customer_email("as ha@example.in").is_err());

        let long = format!("{}@example.in", "a".repeat(250));
        assert!(matches!(
            validate_customer_email(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("RICE-5KG").is_ok());
        assert!(validate_product_code("DAL_1").is_ok());

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Basmati Rice 5kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_price_paise(0).is_ok());
        assert!(validate_price_paise(-1).is_err());
        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_denomination_value(1).is_ok());
        assert!(validate_denomination_value(0).is_err());
        assert!(validate_denomination_count(0).is_ok());
        assert!(validate_denomination_count(-3).is_err());
    }

    #[test]
    fn test_validate_cart() {
        assert!(validate_cart(&[]).is_err());
        assert!(validate_cart(&[CartLine::new("RICE-5KG", 1)]).is_ok());

        // Zero quantity is the pricer's concern, not validation's
        assert!(validate_cart(&[CartLine::new("RICE-5KG", 0)]).is_ok());

        assert!(validate_cart(&[CartLine::new("bad code", 1)]).is_err());

        let too_many: Vec<CartLine> = (0..=MAX_CART_LINES)
            .map(|_| CartLine::new("RICE-5KG", 1))
            .collect();
        assert!(validate_cart(&too_many).is_err());
    }
}

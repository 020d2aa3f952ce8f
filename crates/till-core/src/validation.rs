//! # Validation Module
//!
//! Input validation for cart edits and register configuration.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register front end                                            │
//! │  ├── Scanner / keypad input                                             │
//! │  └── Immediate cashier feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (cart edits, config)                              │
//! │  ├── Barcode format, quantity bounds, cart size                         │
//! │  └── VAT rate bounds                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Catalog normalization (never errors, excludes instead)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_barcode, validate_quantity};
//!
//! assert!(validate_barcode("6281007041155").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum barcode length accepted from the scanner.
const MAX_BARCODE_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 64 characters
/// - No whitespace or commas (catalog lists are comma-separated)
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_barcode;
///
/// assert!(validate_barcode("COKE-330").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("A,B").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if barcode.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain whitespace or commas".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity being added to the cart.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// Cashier scans item / types quantity: 5
///       │
///       ▼
/// validate_quantity(5) ← THIS FUNCTION
///       │
///       ├── qty <= 0?  → Error
///       ├── qty > 999? → Error
///       └── OK → Cart::add_product
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 || qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a quantity typed over an existing cart line.
///
/// Zero is allowed here (it removes the line).
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit or bundle price read from a snapshot.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_UNIT_PRICE_CENTS
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > Money::from_cents(MAX_UNIT_PRICE_CENTS) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a VAT rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct line fits in the cart.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
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
    fn test_validate_barcode() {
        assert!(validate_barcode("6281007041155").is_ok());
        assert!(validate_barcode("COKE-330").is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode("A,B").is_err());
        assert!(validate_barcode(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(MAX_UNIT_PRICE_CENTS)).is_ok());

        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_price(Money::from_cents(MAX_UNIT_PRICE_CENTS + 1)).is_err());
        assert!(validate_price("79228162514264337593543950335".parse().unwrap()).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_line_quantity_allows_zero() {
        assert!(validate_line_quantity(0).is_ok());
        assert!(validate_line_quantity(999).is_ok());
        assert!(validate_line_quantity(-1).is_err());
        assert!(validate_line_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1500).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(99).is_ok());
        assert!(validate_cart_size(100).is_err());
    }
}

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
//! │  ├── CoreError        - Cart and checkout rule violations               │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  till-checkout errors (app)                                             │
//! │  └── ApiError         - What the register front end sees (serialized)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! The promotion engine itself never fails. Malformed catalog records are
//! excluded during normalization, degenerate arithmetic resolves to zero, and
//! a program that cannot form a set is skipped. The only engine-level error
//! is [`CoreError::UnresolvedConflicts`], returned when checkout is finalized
//! while a promotion conflict still needs a choice.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (by barcode).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Barcode is not in the cart.
    #[error("Barcode {0} is not in the cart")]
    NotInCart(String),

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout was attempted while promotion conflicts lack a selection.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: Burger x3, Fries x1, Cola x1
    ///      │
    ///      ▼
    /// "Buy 2 Burgers get Fries" vs "Buy 2 Burgers get Cola"
    ///      │
    ///      ▼
    /// finalize_checkout → UnresolvedConflicts { trigger_barcodes: ["BURGER"] }
    ///      │
    ///      ▼
    /// UI opens the promotion choice dialog
    /// ```
    #[error("Select a promotion for: {}", .trigger_barcodes.join(", "))]
    UnresolvedConflicts { trigger_barcodes: Vec<String> },

    /// A selection names a conflict or program that does not exist.
    #[error("Program {program_id} is not an option for trigger {trigger_barcode}")]
    InvalidSelection {
        trigger_barcode: String,
        program_id: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
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

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A VAT invoice was requested without a customer name.
    #[error("Customer name is required for a VAT invoice")]
    VatInvoiceWithoutName,
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
        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1000 exceeds maximum allowed (999)");
    }

    #[test]
    fn test_unresolved_conflicts_lists_triggers() {
        let err = CoreError::UnresolvedConflicts {
            trigger_barcodes: vec!["A".to_string(), "D".to_string()],
        };
        assert_eq!(err.to_string(), "Select a promotion for: A, D");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

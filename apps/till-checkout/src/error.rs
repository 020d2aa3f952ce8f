//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till POS                               │
//! │                                                                         │
//! │  Command Function  Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── Snapshot file unreadable? ── SnapshotError ──┐              │
//! │         ├── Config file invalid?      ── ConfigError ────┤              │
//! │         ├── Cart / checkout rule?     ── CoreError ──────┼──► ApiError  │
//! │         └── Success ─────────────────────────────────────┼──► JSON      │
//! │                                                          │              │
//! │  Front end receives:                                     ▼              │
//! │  { "code": "UNRESOLVED_CONFLICT",                                       │
//! │    "message": "Select a promotion for: 6281000000017" }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::CoreError;

use crate::state::{ConfigError, SnapshotError};

/// API error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 6281000000017"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or cart line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart operation failed
    CartError,

    /// Checkout attempted while a promotion conflict needs a choice
    UnresolvedConflict,

    /// Catalog or product snapshot could not be loaded
    CatalogError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Process exit code for the one-shot CLI.
    pub fn exit_code(&self) -> u8 {
        match self.code {
            ErrorCode::UnresolvedConflict => 3,
            ErrorCode::CatalogError | ErrorCode::ConfigError => 4,
            ErrorCode::Internal => 1,
            _ => 2,
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(barcode) => ApiError::not_found("Product", &barcode),
            CoreError::NotInCart(barcode) => ApiError::not_found("Cart line", &barcode),
            e @ CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, e.to_string()),
            e @ CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, e.to_string()),
            e @ CoreError::QuantityTooLarge { .. } => ApiError::validation(e.to_string()),
            e @ CoreError::UnresolvedConflicts { .. } => {
                ApiError::new(ErrorCode::UnresolvedConflict, e.to_string())
            }
            e @ CoreError::InvalidSelection { .. } => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts snapshot loading errors to API errors.
impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        tracing::error!(error = %err, "Snapshot load failed");
        ApiError::new(ErrorCode::CatalogError, err.to_string())
    }
}

/// Converts configuration errors to API errors.
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Config load failed");
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("Failed to encode response: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_conflict_mapping() {
        let err: ApiError = CoreError::UnresolvedConflicts {
            trigger_barcodes: vec!["A".to_string()],
        }
        .into();

        assert_eq!(err.code, ErrorCode::UnresolvedConflict);
        assert_eq!(err.message, "Select a promotion for: A");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Product", "123");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: 123");
    }

    #[test]
    fn test_empty_cart_is_cart_error() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(err.exit_code(), 2);
    }
}

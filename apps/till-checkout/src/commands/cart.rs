//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐        │
//! │  │  Empty   │────►│ In Cart  │────►│ Conflict │────►│ Finalized│        │
//! │  │  Cart    │     │          │     │  Choice  │     │  Order   │        │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘        │
//! │                        │                 │                │             │
//! │                   add_to_cart      select_promotion  finalize_checkout  │
//! │                   update_item      (promotions.rs)   (checkout.rs)      │
//! │                   remove_item                             │             │
//! │                        │                                  │             │
//! │                        ▼                                  ▼             │
//! │                   clear_cart ◄──────────────────── (back to empty)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use till_core::CoreError;

use super::{reprice, CartResponse};
use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState};

/// Gets the current cart with pricing.
pub fn get_cart(catalog: &CatalogState, cart: &CartState, config: &ConfigState) -> CartResponse {
    debug!("get_cart command");
    cart.write(|s| reprice(s, catalog, config))
}

/// Adds a product to the cart by barcode.
///
/// ## Behavior
/// - If the product is already in the cart: quantity increases
/// - Otherwise: added as a new line with its price frozen
pub fn add_to_cart(
    catalog: &CatalogState,
    cart: &CartState,
    config: &ConfigState,
    barcode: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(barcode = %barcode, quantity = %quantity, "add_to_cart command");

    let product = catalog
        .product(barcode)
        .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))?;

    cart.write(|s| {
        s.cart.add_product(product, quantity)?;
        Ok::<_, ApiError>(reprice(s, catalog, config))
    })
}

/// Sets the quantity of a cart line. Zero removes it.
pub fn update_cart_item(
    catalog: &CatalogState,
    cart: &CartState,
    config: &ConfigState,
    barcode: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(barcode = %barcode, quantity = %quantity, "update_cart_item command");

    cart.write(|s| {
        s.cart.set_quantity(barcode, quantity)?;
        Ok::<_, ApiError>(reprice(s, catalog, config))
    })
}

/// Removes a cart line.
pub fn remove_from_cart(
    catalog: &CatalogState,
    cart: &CartState,
    config: &ConfigState,
    barcode: &str,
) -> Result<CartResponse, ApiError> {
    debug!(barcode = %barcode, "remove_from_cart command");

    cart.write(|s| {
        s.cart.remove(barcode)?;
        Ok::<_, ApiError>(reprice(s, catalog, config))
    })
}

/// Clears the cart and its promotion selections.
///
/// ## When Used
/// - Cashier cancels the sale
/// - After checkout (next customer)
pub fn clear_cart(catalog: &CatalogState, cart: &CartState, config: &ConfigState) -> CartResponse {
    debug!("clear_cart command");

    cart.write(|s| {
        s.reset();
        reprice(s, catalog, config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{burger_catalog, config};

    #[test]
    fn test_add_and_update() {
        let catalog = burger_catalog();
        let cart = CartState::new();
        let config = config();

        let response = add_to_cart(&catalog, &cart, &config, "BURGER", Some(2)).unwrap();
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.pricing.totals.total.cents(), 3000);

        let response = update_cart_item(&catalog, &cart, &config, "BURGER", 5).unwrap();
        assert_eq!(response.lines[0].quantity, 5);
    }

    #[test]
    fn test_unknown_barcode() {
        let err = add_to_cart(&burger_catalog(), &CartState::new(), &config(), "NOPE", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_remove_missing_line() {
        let err = remove_from_cart(&burger_catalog(), &CartState::new(), &config(), "BURGER").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_quantity_limit_is_validation_error() {
        let catalog = burger_catalog();
        let cart = CartState::new();
        add_to_cart(&catalog, &cart, &config(), "BURGER", Some(1)).unwrap();

        let err = update_cart_item(&catalog, &cart, &config(), "BURGER", 1000).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_clear() {
        let catalog = burger_catalog();
        let cart = CartState::new();
        add_to_cart(&catalog, &cart, &config(), "FRIES", None).unwrap();

        let response = clear_cart(&catalog, &cart, &config());
        assert!(response.lines.is_empty());
        assert!(response.pricing.totals.total.is_zero());
    }
}

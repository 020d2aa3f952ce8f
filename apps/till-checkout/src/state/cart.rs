//! # Cart State
//!
//! The cart in progress and the cashier's promotion choices for it.
//!
//! ## Thread Safety
//! The session is wrapped in a `Mutex`: every command that edits the cart
//! must re-price and prune selections as one step, so the cart and its
//! selections never drift apart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Cashier Action           Command                 Session Change        │
//! │  ──────────────           ───────                 ──────────────        │
//! │                                                                         │
//! │  Scan Product ───────────► add_to_cart() ───────► cart.add_product      │
//! │  Change Quantity ────────► update_cart_item() ──► cart.set_quantity     │
//! │  Remove Line ────────────► remove_from_cart() ──► cart.remove           │
//! │  Pick Promotion ─────────► select_promotion() ──► selections.select     │
//! │  Invoice Details ────────► set_customer() ──────► customer              │
//! │  New Customer ───────────► clear_cart() ────────► cart + selections     │
//! │                                                                         │
//! │  After every change: price_cart → selections.prune(conflicts)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use till_core::{Cart, CustomerInfo, SelectionStore};

/// The cart being rung up, its promotion selections and the invoice
/// customer.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSession {
    pub cart: Cart,
    pub selections: SelectionStore,
    pub customer: CustomerInfo,
}

impl RegisterSession {
    pub fn new() -> Self {
        RegisterSession::default()
    }

    /// Starts over for the next customer.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.selections.clear();
        self.customer = CustomerInfo::default();
    }
}

/// Shared register session state.
#[derive(Debug, Default)]
pub struct CartState {
    session: Mutex<RegisterSession>,
}

impl CartState {
    /// Creates a state with an empty cart.
    pub fn new() -> Self {
        CartState::default()
    }

    /// Creates a state around an existing cart (a restored snapshot).
    pub fn with_cart(cart: Cart) -> Self {
        CartState {
            session: Mutex::new(RegisterSession {
                cart,
                ..RegisterSession::new()
            }),
        }
    }

    /// Executes a function with read access to the session.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RegisterSession) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.write(|s| s.cart.add_product(&product, 1))?;
    /// ```
    pub fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RegisterSession) -> R,
    {
        f(&mut self.lock())
    }

    /// Poisoning is ignored; each edit is a single `Cart` call.
    fn lock(&self) -> MutexGuard<'_, RegisterSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{CartLine, Money};

    #[test]
    fn test_write_then_read() {
        let state = CartState::new();
        state.write(|s| {
            s.cart.lines.push(CartLine::new("A", "Apple", 2, Money::from_cents(100)));
        });

        assert_eq!(state.read(|s| s.cart.total_quantity()), 2);
    }

    #[test]
    fn test_reset_clears_cart_and_selections() {
        let state = CartState::with_cart(Cart::from_lines(vec![CartLine::new(
            "A",
            "Apple",
            1,
            Money::from_cents(100),
        )]));

        state.write(|s| s.customer.name = Some("Huda".to_string()));

        state.write(RegisterSession::reset);
        assert!(state.read(|s| s.cart.is_empty() && s.selections.is_empty() && s.customer.is_empty()));
    }
}

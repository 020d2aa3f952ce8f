//! # Commands Module
//!
//! Everything the register front end can ask for.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports, shared response)
//! ├── cart.rs        ◄─── Cart manipulation
//! ├── promotions.rs  ◄─── Conflict listing and promotion choice
//! └── checkout.rs    ◄─── Finalization into an order draft
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Read only
//! fn get_conflicts(catalog: &CatalogState, cart: &CartState)
//!
//! // Edits the cart, then re-prices with the VAT rate from config
//! fn add_to_cart(catalog: &CatalogState, cart: &CartState, config: &ConfigState, ..)
//! ```
//!
//! Every command that changes the cart returns a fresh [`CartResponse`];
//! nothing is priced incrementally.

pub mod cart;
pub mod checkout;
pub mod promotions;

use serde::Serialize;
use till_core::{detect_conflicts, price_cart, CartLine, CartPricing};

use crate::state::{CatalogState, ConfigState, RegisterSession};

/// Cart lines plus the full pricing pass for them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub pricing: CartPricing,
}

/// Prunes stale selections and prices the session's cart.
pub(crate) fn reprice(session: &mut RegisterSession, catalog: &CatalogState, config: &ConfigState) -> CartResponse {
    let conflicts = detect_conflicts(&session.cart, catalog.catalog());
    session.selections.prune(&conflicts);

    let pricing = price_cart(&session.cart, catalog.catalog(), &session.selections, config.vat_rate());
    CartResponse {
        lines: session.cart.lines.clone(),
        pricing,
    }
}

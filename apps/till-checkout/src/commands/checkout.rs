//! # Checkout Commands
//!
//! Finalizes the cart into an [`OrderDraft`].
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Flow                                        │
//! │                                                                         │
//! │  finalize_checkout(payment)                                             │
//! │         │                                                               │
//! │         ├── Cart empty? ──────────────────────► CART_ERROR              │
//! │         ├── Conflict without a selection? ───► UNRESOLVED_CONFLICT      │
//! │         ├── VAT number without a name? ──────► VALIDATION_ERROR         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  price_cart ──► annotate lines ──► OrderDraft ──► session reset         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot variants price a cart read from disk without touching any
//! session; they back the one-shot `price` and `checkout` subcommands.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use till_core::{
    detect_conflicts, price_cart, Cart, CartLine, CartPricing, CustomerInfo, OrderDraft, PaymentMethod, SelectionStore,
};

use crate::error::{ApiError, ErrorCode};
use crate::state::{read_json, CartState, CatalogState, ConfigState};

/// Finalizes the session's cart and starts a new one.
///
/// On any error the cart, selections and customer are left as they were.
pub fn finalize_checkout(
    catalog: &CatalogState,
    cart: &CartState,
    config: &ConfigState,
    payment_method: PaymentMethod,
) -> Result<OrderDraft, ApiError> {
    debug!(?payment_method, "finalize_checkout command");

    cart.write(|s| {
        let conflicts = detect_conflicts(&s.cart, catalog.catalog());
        s.selections.prune(&conflicts);

        let pricing = till_core::finalize_checkout(&s.cart, catalog.catalog(), &s.selections, config.vat_rate())?;
        let draft = OrderDraft::new(&s.cart, pricing, payment_method, s.customer.clone())?;
        s.reset();

        info!(
            order_id = %draft.id,
            lines = draft.lines.len(),
            total = %config.format_currency(draft.totals.total),
            payment = ?draft.payment_method,
            "Order draft created"
        );
        Ok(draft)
    })
}

/// Invoice fields the cashier can set on the session customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Phone,
    VatNumber,
}

impl CustomerField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "name" => Some(CustomerField::Name),
            "phone" => Some(CustomerField::Phone),
            "vat" => Some(CustomerField::VatNumber),
            _ => None,
        }
    }
}

/// Sets one customer field; a blank value clears it.
pub fn set_customer(cart: &CartState, field: CustomerField, value: &str) -> CustomerInfo {
    debug!(?field, "set_customer command");

    cart.write(|s| {
        let value = Some(value.to_string());
        let current = std::mem::take(&mut s.customer);
        s.customer = match field {
            CustomerField::Name => CustomerInfo { name: value, ..current },
            CustomerField::Phone => CustomerInfo { phone: value, ..current },
            CustomerField::VatNumber => CustomerInfo {
                vat_number: value,
                ..current
            },
        }
        .normalized();
        s.customer.clone()
    })
}

/// Forgets the session customer.
pub fn clear_customer(cart: &CartState) {
    debug!("clear_customer command");
    cart.write(|s| s.customer = CustomerInfo::default());
}

// =============================================================================
// Snapshots
// =============================================================================

/// Reads a cart snapshot: either `{ "lines": [...] }` or a bare array of lines.
///
/// Lines go through the same checks as scanned items, and repeated
/// barcodes are merged.
pub fn load_cart(path: &Path) -> Result<Cart, ApiError> {
    let lines = match read_json(path)? {
        lines @ Value::Array(_) => serde_json::from_value::<Vec<CartLine>>(lines)?,
        other @ Value::Object(_) => serde_json::from_value::<Cart>(other)?.lines,
        _ => {
            return Err(ApiError::new(
                ErrorCode::CartError,
                format!("{} must contain a cart object or an array of lines", path.display()),
            ))
        }
    };
    Ok(Cart::restore(lines)?)
}

/// Applies `TRIGGER=PROGRAM` choices against the cart's conflicts.
fn selections_for(catalog: &CatalogState, cart: &Cart, choices: &[(String, String)]) -> Result<SelectionStore, ApiError> {
    let conflicts = detect_conflicts(cart, catalog.catalog());
    let mut selections = SelectionStore::new();
    for (trigger, program) in choices {
        selections.select(&conflicts, trigger, program)?;
    }
    Ok(selections)
}

/// Prices a standalone cart.
pub fn price_snapshot(
    catalog: &CatalogState,
    config: &ConfigState,
    cart: &Cart,
    choices: &[(String, String)],
) -> Result<CartPricing, ApiError> {
    let selections = selections_for(catalog, cart, choices)?;
    Ok(price_cart(cart, catalog.catalog(), &selections, config.vat_rate()))
}

/// Finalizes a standalone cart.
pub fn checkout_snapshot(
    catalog: &CatalogState,
    config: &ConfigState,
    cart: &Cart,
    choices: &[(String, String)],
    payment_method: PaymentMethod,
    customer: CustomerInfo,
) -> Result<OrderDraft, ApiError> {
    let selections = selections_for(catalog, cart, choices)?;
    let pricing = till_core::finalize_checkout(cart, catalog.catalog(), &selections, config.vat_rate())?;
    Ok(OrderDraft::new(cart, pricing, payment_method, customer)?)
}

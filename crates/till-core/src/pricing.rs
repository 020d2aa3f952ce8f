//! # Pricing Pipeline
//!
//! One full pass over a cart snapshot.
//!
//! ```text
//! ┌──────────┐   ┌──────────────────┐   ┌────────────┐   ┌────────────────┐
//! │   Cart   │──►│ detect_conflicts │──►│  allocate  │──►│ compute_totals │
//! │ Catalog  │   └──────────────────┘   └────────────┘   └────────────────┘
//! │Selections│           │                    │                  │
//! └──────────┘           ▼                    ▼                  ▼
//!                  conflicts,          sections,             totals
//!                  unresolved          remaining items
//! ```
//!
//! [`price_cart`] never fails and backs every cart redraw.
//! [`finalize_checkout`] is the same pass with the checkout preconditions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::allocation::{allocate, RemainingItem, Section};
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::conflict::{detect_conflicts, ConflictGroup};
use crate::error::{CoreError, CoreResult};
use crate::selection::SelectionStore;
use crate::totals::{compute_totals, Totals};
use crate::types::TaxRate;

/// Everything the register, receipt and customer display render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    pub conflicts: Vec<ConflictGroup>,
    /// Trigger barcodes still waiting for a selection.
    pub unresolved_conflicts: Vec<String>,
    pub sections: Vec<Section>,
    pub remaining_items: Vec<RemainingItem>,
    pub totals: Totals,
}

impl CartPricing {
    /// Returns true when no conflict is waiting for a choice.
    pub fn is_resolved(&self) -> bool {
        self.unresolved_conflicts.is_empty()
    }
}

/// Prices a cart.
pub fn price_cart(cart: &Cart, catalog: &Catalog, selections: &SelectionStore, rate: TaxRate) -> CartPricing {
    let conflicts = detect_conflicts(cart, catalog);
    let unresolved_conflicts = selections.unresolved(&conflicts);
    let allocation = allocate(cart, catalog, &conflicts, selections);
    let totals = compute_totals(&allocation, rate);

    debug!(
        lines = cart.item_count(),
        conflicts = conflicts.len(),
        unresolved = unresolved_conflicts.len(),
        sections = allocation.sections.len(),
        total = %totals.total,
        "Cart priced"
    );

    CartPricing {
        conflicts,
        unresolved_conflicts,
        sections: allocation.sections,
        remaining_items: allocation.remaining_items,
        totals,
    }
}

/// Prices a cart for checkout.
///
/// ## Errors
/// - [`CoreError::EmptyCart`] when no line has a positive quantity
/// - [`CoreError::UnresolvedConflicts`] while a conflict lacks a valid
///   selection
pub fn finalize_checkout(
    cart: &Cart,
    catalog: &Catalog,
    selections: &SelectionStore,
    rate: TaxRate,
) -> CoreResult<CartPricing> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let pricing = price_cart(cart, catalog, selections, rate);
    if !pricing.is_resolved() {
        return Err(CoreError::UnresolvedConflicts {
            trigger_barcodes: pricing.unresolved_conflicts,
        });
    }

    info!(
        sections = pricing.sections.len(),
        total = %pricing.totals.total,
        "Checkout finalized"
    );
    Ok(pricing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::catalog::LoyaltyProgram;
    use crate::money::Money;

    fn burger_cart() -> Cart {
        Cart::from_lines(vec![
            CartLine::new("A", "Burger", 3, Money::from_cents(1500)),
            CartLine::new("B", "Fries", 1, Money::from_cents(500)),
            CartLine::new("C", "Cola", 1, Money::from_cents(300)),
        ])
    }

    fn burger_catalog() -> Catalog {
        Catalog::from_programs(vec![
            LoyaltyProgram::buy_x_get_y("P1", "Burger + Fries", &["A"], &["B"], 2, 1),
            LoyaltyProgram::buy_x_get_y("P2", "Burger + Cola", &["A"], &["C"], 2, 1),
        ])
    }

    #[test]
    fn test_price_cart_reports_unresolved() {
        let pricing = price_cart(&burger_cart(), &burger_catalog(), &SelectionStore::new(), TaxRate::from_bps(1500));

        assert_eq!(pricing.conflicts.len(), 1);
        assert_eq!(pricing.unresolved_conflicts, vec!["A"]);
        assert!(pricing.sections.is_empty());
        assert_eq!(pricing.totals.total.cents(), 5300);
    }

    #[test]
    fn test_finalize_refuses_until_selected() {
        let cart = burger_cart();
        let catalog = burger_catalog();
        let rate = TaxRate::from_bps(1500);
        let mut selections = SelectionStore::new();

        let err = finalize_checkout(&cart, &catalog, &selections, rate).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnresolvedConflicts { ref trigger_barcodes } if trigger_barcodes == &["A".to_string()]
        ));

        let conflicts = detect_conflicts(&cart, &catalog);
        selections.select(&conflicts, "A", "P1").unwrap();

        let pricing = finalize_checkout(&cart, &catalog, &selections, rate).unwrap();
        assert_eq!(pricing.sections.len(), 1);
        assert_eq!(pricing.totals.total_discount.cents(), 500);
        assert_eq!(pricing.totals.total.cents(), 4800);
    }

    #[test]
    fn test_finalize_empty_cart() {
        let err = finalize_checkout(&Cart::new(), &burger_catalog(), &SelectionStore::new(), TaxRate::zero()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_pricing_serializes_camel_case() {
        let pricing = price_cart(&burger_cart(), &burger_catalog(), &SelectionStore::new(), TaxRate::zero());
        let json = serde_json::to_value(&pricing).unwrap();

        assert!(json.get("unresolvedConflicts").is_some());
        assert!(json.get("remainingItems").is_some());
        assert!(json["totals"].get("totalDiscount").is_some());
        assert_eq!(json["conflicts"][0]["triggerBarcode"], "A");
    }
}

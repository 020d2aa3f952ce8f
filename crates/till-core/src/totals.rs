//! # Totals
//!
//! Folds an allocation into the payment summary.
//!
//! ## VAT-Inclusive Model
//! ```text
//! subtotal       = Σ section lines at pre-discount price + Σ remaining items
//! total_discount = Σ section.total_discount
//! net            = subtotal − total_discount
//! total_tax      = net × rate / (1 + rate)        (already inside net)
//! total          = net
//! ```
//!
//! Values carry full precision. Call [`Totals::rounded`] for display.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::allocation::{Allocation, Section};
use crate::money::Money;
use crate::types::TaxRate;

/// The payment summary for a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Gross, before any promotion.
    pub subtotal: Money,
    pub total_discount: Money,
    /// VAT contained in `total`.
    pub total_tax: Money,
    /// Amount due, tax inclusive.
    pub total: Money,
}

impl Totals {
    /// Every amount rounded to the minor unit.
    pub fn rounded(&self) -> Totals {
        Totals {
            subtotal: self.subtotal.round_to_minor(),
            total_discount: self.total_discount.round_to_minor(),
            total_tax: self.total_tax.round_to_minor(),
            total: self.total.round_to_minor(),
        }
    }
}

/// Computes totals for an allocation.
pub fn compute_totals(allocation: &Allocation, rate: TaxRate) -> Totals {
    let sections: Money = allocation.sections.iter().map(Section::gross).sum();
    let remaining: Money = allocation.remaining_items.iter().map(|r| r.line_subtotal).sum();
    let subtotal = sections + remaining;

    let total_discount: Money = allocation
        .sections
        .iter()
        .map(|s| s.total_discount)
        .sum::<Money>()
        .non_negative();

    let net = (subtotal - total_discount).non_negative();

    Totals {
        subtotal,
        total_discount,
        total_tax: net.extract_vat(rate),
        total: net,
    }
}

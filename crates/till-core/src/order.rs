//! # Order Annotation
//!
//! Maps section consumption back onto cart lines for order submission.
//!
//! ## Per-Line Annotation
//! ```text
//! Cart line A x3 ──┬── Section "Buy 2 Get 1"  trigger A x2, reward A x1 free
//!                  │
//!                  ▼
//! OrderLine { barcode: A, quantity: 3, promotionName: "Buy 2 Get 1",
//!             discountAmount: 10.00, isReward: true }
//! ```
//!
//! - `promotion_name`: last section rewarding the barcode, else last section
//!   triggered by it
//! - `discount_amount`: reward-line discounts, plus the barcode's share of
//!   any fixed-bundle discount (by line total)
//! - `is_reward`: some reward line gave the barcode away free
//!
//! The draft also records how the customer paid and, for invoices, who the
//! customer is. A customer VAT number is only accepted with a name.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::allocation::{RemainingItem, Section};
use crate::cart::Cart;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::CartPricing;
use crate::totals::Totals;
use crate::validation::ValidationResult;

/// A cart line with its promotion annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub barcode: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    pub promotion_name: Option<String>,
    pub discount_amount: Money,
    pub is_reward: bool,
}

/// Annotates each cart barcode (in cart order) from the sections.
pub fn annotate_order_lines(cart: &Cart, sections: &[Section]) -> Vec<OrderLine> {
    cart.stock()
        .lines()
        .iter()
        .filter(|line| line.quantity > 0)
        .map(|line| {
            let barcode = line.barcode;

            let rewarded_by = sections
                .iter()
                .rev()
                .find(|s| s.reward_lines.iter().any(|r| r.barcode == barcode));
            let triggered_by = sections
                .iter()
                .rev()
                .find(|s| s.trigger_lines.iter().any(|t| t.barcode == barcode));

            let discount_amount = sections.iter().map(|s| discount_share(s, barcode)).sum();
            let is_reward = sections
                .iter()
                .flat_map(|s| &s.reward_lines)
                .any(|r| r.barcode == barcode && r.free_qty > 0);

            OrderLine {
                barcode: barcode.to_string(),
                name: line.name.to_string(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.unit_price.multiply_quantity(line.quantity),
                promotion_name: rewarded_by.or(triggered_by).map(|s| s.program_name.clone()),
                discount_amount,
                is_reward,
            }
        })
        .collect()
}

/// The part of a section's discount attributed to `barcode`.
fn discount_share(section: &Section, barcode: &str) -> Money {
    if !section.reward_lines.is_empty() {
        return section
            .reward_lines
            .iter()
            .filter(|r| r.barcode == barcode)
            .map(|r| r.discount_amount)
            .sum();
    }

    let line_total: Money = section
        .trigger_lines
        .iter()
        .filter(|t| t.barcode == barcode)
        .map(|t| t.line_total)
        .sum();

    section.total_discount.share(line_total, section.gross())
}

// =============================================================================
// Payment & Customer
// =============================================================================

/// How the order was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Card payment on the external terminal.
    Card,
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: "expected cash or card".to_string(),
            }),
        }
    }
}

/// Customer details printed on the invoice.
///
/// Fields are trimmed and blank fields become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vat_number: Option<String>,
}

impl CustomerInfo {
    pub fn new(name: Option<String>, phone: Option<String>, vat_number: Option<String>) -> Self {
        CustomerInfo {
            name,
            phone,
            vat_number,
        }
        .normalized()
    }

    /// Trims every field, dropping blank ones.
    pub fn normalized(self) -> Self {
        fn tidy(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        CustomerInfo {
            name: tidy(self.name),
            phone: tidy(self.phone),
            vat_number: tidy(self.vat_number),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.vat_number.is_none()
    }

    /// A VAT number needs a customer name on the invoice.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.vat_number.is_some() && self.name.is_none() {
            return Err(ValidationError::VatInvoiceWithoutName);
        }
        Ok(())
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// The finalized checkout handed to order submission, receipts and the
/// customer display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub sections: Vec<Section>,
    pub remaining_items: Vec<RemainingItem>,
    pub totals: Totals,
    pub payment_method: PaymentMethod,
    /// Present only when some customer detail was given.
    pub customer: Option<CustomerInfo>,
}

impl OrderDraft {
    /// Builds a draft from a finalized pricing of `cart`.
    ///
    /// Fails when the customer details cannot go on an invoice.
    pub fn new(
        cart: &Cart,
        pricing: CartPricing,
        payment_method: PaymentMethod,
        customer: CustomerInfo,
    ) -> CoreResult<Self> {
        let customer = customer.normalized();
        customer.validate()?;

        Ok(OrderDraft {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            lines: annotate_order_lines(cart, &pricing.sections),
            sections: pricing.sections,
            remaining_items: pricing.remaining_items,
            totals: pricing.totals,
            payment_method,
            customer: (!customer.is_empty()).then_some(customer),
        })
    }

    /// Sum of per-line discounts; equals `totals.total_discount`.
    pub fn line_discount_total(&self) -> Money {
        self.lines.iter().map(|l| l.discount_amount).sum()
    }
}

//! # Conflict Detection
//!
//! Finds trigger products that could satisfy more than one buy-X-get-Y
//! program, each with a different reward product in the cart.
//!
//! ## Example
//! ```text
//! Cart: Burger x3, Fries x1, Cola x1
//!
//!   P1 "Burger + Fries"  trigger=Burger min=2  reward=Fries ─┐
//!   P2 "Burger + Cola"   trigger=Burger min=2  reward=Cola  ─┼─► ConflictGroup(Burger)
//!   P3 "Burger BOGO"     trigger=Burger reward=Burger       ─┘   options: [P1, P2]
//!                        (same product, never competes)
//! ```
//!
//! The cashier must pick one option per group before checkout can be
//! finalized. Detection re-runs on every pass; nothing here is persisted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::{Catalog, LoyaltyProgram, ProgramType};
use crate::money::Money;

/// One program the cashier can choose for a conflicted trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConflictOption {
    pub program_id: String,
    pub program_name: String,
    /// Distinct reward barcodes present in sufficient quantity.
    pub reward_barcodes_in_cart: Vec<String>,
    /// Σ reward unit price × reward quantity, over `reward_barcodes_in_cart`.
    pub potential_savings: Money,
}

/// Programs competing for the same trigger barcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConflictGroup {
    pub trigger_barcode: String,
    pub trigger_name: String,
    /// At least two options, in catalog order.
    pub options: Vec<ConflictOption>,
}

impl ConflictGroup {
    /// Returns true when `program_id` is one of this group's options.
    pub fn has_option(&self, program_id: &str) -> bool {
        self.options.iter().any(|o| o.program_id == program_id)
    }
}

/// Detects conflict groups for the cart.
///
/// Only active `BUY_X_GET_Y` programs with distinct rewards take part. A
/// program is triggered by its first listed trigger barcode with enough cart
/// quantity, and needs at least one other reward barcode in the cart with
/// quantity ≥ `reward_quantity`.
pub fn detect_conflicts(cart: &Cart, catalog: &Catalog) -> Vec<ConflictGroup> {
    let stock = cart.stock();
    let mut groups: Vec<ConflictGroup> = Vec::new();

    for program in catalog.active_programs().filter(|p| competes(p)) {
        let Some(trigger) = program
            .trigger_barcodes
            .iter()
            .find(|t| stock.quantity(t) >= program.min_quantity)
        else {
            continue;
        };

        let rewards: Vec<&String> = program
            .reward_barcodes
            .iter()
            .filter(|r| *r != trigger && stock.quantity(r) >= program.reward_quantity)
            .collect();
        if rewards.is_empty() {
            continue;
        }

        let potential_savings = rewards
            .iter()
            .filter_map(|r| stock.get(r))
            .map(|line| line.unit_price.multiply_quantity(program.reward_quantity))
            .sum();

        let option = ConflictOption {
            program_id: program.id.clone(),
            program_name: program.name.clone(),
            reward_barcodes_in_cart: rewards.into_iter().cloned().collect(),
            potential_savings,
        };

        match groups.iter_mut().find(|g| &g.trigger_barcode == trigger) {
            Some(group) => group.options.push(option),
            None => {
                let trigger_name = stock
                    .get(trigger)
                    .map(|l| l.name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(trigger.as_str())
                    .to_string();
                groups.push(ConflictGroup {
                    trigger_barcode: trigger.clone(),
                    trigger_name,
                    options: vec![option],
                });
            }
        }
    }

    groups.retain(|g| g.options.len() >= 2);
    groups
}

fn competes(program: &LoyaltyProgram) -> bool {
    program.program_type == ProgramType::BuyXGetY && program.has_distinct_rewards
}

// =============================================================================
// Unit Tests
// =============================================================================

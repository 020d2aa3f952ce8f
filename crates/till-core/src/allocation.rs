//! # Allocation Engine
//!
//! Greedily consumes cart quantity into non-overlapping promotion sections.
//!
//! ## One Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       allocate(cart, catalog, ..)                       │
//! │                                                                         │
//! │  1. Filter   active programs; a program touching a conflicted trigger   │
//! │              must be the selected one for it                            │
//! │                                                                         │
//! │  2. Order    BUY_X_GET_Y first, then PERCENT_DISCOUNT (stable)          │
//! │                                                                         │
//! │  3. Consume  per program, against pass-wide state:                      │
//! │              consumed[barcode]   units already used by a section        │
//! │              rewarded{barcode}   reward barcodes already granted        │
//! │                                                                         │
//! │              fixed bundle ──► pool triggers, price sets at bundle price │
//! │              percent      ──► one section per qualifying reward         │
//! │              buy X get Y  ──► first qualifying pairing, rewards free    │
//! │                                                                         │
//! │  4. Remainder  cart qty − consumed, in cart order                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Per barcode: Σ consumed across sections + remaining == cart quantity
//! - A reward barcode is rewarded by at most one section per pass
//! - Discounts and section subtotals are never negative
//! - Same inputs produce the same sections, in the same order
//!
//! The engine is greedy and first-match. It does not search for the pairing
//! that saves the customer the most.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::cart::{Cart, CartStock};
use crate::catalog::{Catalog, LoyaltyProgram, ProgramType};
use crate::conflict::ConflictGroup;
use crate::money::Money;
use crate::selection::SelectionStore;

// =============================================================================
// Output Types
// =============================================================================

/// Trigger units a section consumed, at full price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TriggerLine {
    pub barcode: String,
    pub name: String,
    pub unit_price: Money,
    pub consumed_qty: i64,
    pub line_total: Money,
}

/// Reward units a section consumed.
///
/// `free_qty` equals `consumed_qty` for buy-X-get-Y rewards and is 0 for
/// percentage rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RewardLine {
    pub barcode: String,
    pub name: String,
    pub unit_price: Money,
    pub consumed_qty: i64,
    pub free_qty: i64,
    pub discount_amount: Money,
}

impl RewardLine {
    /// Reward units at their pre-discount price.
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.consumed_qty)
    }
}

/// One applied program occurrence: an itemized receipt block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub program_id: String,
    pub program_name: String,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    /// Configured rate for percentage programs; for buy-X-get-Y and fixed
    /// bundles, the discount as a share of the section gross.
    #[ts(as = "String")]
    pub discount_percent: Decimal,
    pub sets: i64,
    pub trigger_lines: Vec<TriggerLine>,
    pub reward_lines: Vec<RewardLine>,
    /// Gross minus this section's discount.
    pub section_subtotal: Money,
    pub total_discount: Money,
}

impl Section {
    /// Trigger and reward lines at pre-discount prices.
    pub fn gross(&self) -> Money {
        let triggers: Money = self.trigger_lines.iter().map(|l| l.line_total).sum();
        let rewards: Money = self.reward_lines.iter().map(RewardLine::gross).sum();
        triggers + rewards
    }

    /// Units of `barcode` this section consumed (trigger and reward lines).
    pub fn consumed_quantity(&self, barcode: &str) -> i64 {
        let triggers: i64 = self
            .trigger_lines
            .iter()
            .filter(|l| l.barcode == barcode)
            .map(|l| l.consumed_qty)
            .sum();
        let rewards: i64 = self
            .reward_lines
            .iter()
            .filter(|l| l.barcode == barcode)
            .map(|l| l.consumed_qty)
            .sum();
        triggers + rewards
    }
}

/// Cart quantity no section consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RemainingItem {
    pub barcode: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_subtotal: Money,
}

/// Result of one allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub sections: Vec<Section>,
    pub remaining_items: Vec<RemainingItem>,
}

impl Allocation {
    /// Units of `barcode` consumed across all sections.
    pub fn consumed_quantity(&self, barcode: &str) -> i64 {
        self.sections.iter().map(|s| s.consumed_quantity(barcode)).sum()
    }

    /// Unconsumed units of `barcode`.
    pub fn remaining_quantity(&self, barcode: &str) -> i64 {
        self.remaining_items
            .iter()
            .filter(|r| r.barcode == barcode)
            .map(|r| r.quantity)
            .sum()
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Runs one allocation pass.
///
/// `conflicts` must come from [`detect_conflicts`](crate::conflict::detect_conflicts)
/// for the same cart and catalog. A program that touches a conflicted trigger
/// barcode only runs when it is the selection for that barcode, so conflicted
/// triggers stay undiscounted until the cashier chooses.
pub fn allocate(
    cart: &Cart,
    catalog: &Catalog,
    conflicts: &[ConflictGroup],
    selections: &SelectionStore,
) -> Allocation {
    let mut programs: Vec<&LoyaltyProgram> = catalog
        .active_programs()
        .filter(|p| passes_selection_filter(p, conflicts, selections))
        .collect();
    programs.sort_by_key(|p| p.program_type.priority());

    let mut pass = Pass::new(cart.stock());
    for program in programs {
        if program.is_fixed_bundle() {
            pass.apply_fixed_bundle(program);
        } else {
            match program.program_type {
                ProgramType::PercentDiscount => pass.apply_percent_discount(program),
                ProgramType::BuyXGetY => pass.apply_buy_x_get_y(program),
            }
        }
    }

    pass.finish()
}

fn passes_selection_filter(program: &LoyaltyProgram, conflicts: &[ConflictGroup], selections: &SelectionStore) -> bool {
    conflicts
        .iter()
        .filter(|g| program.has_trigger(&g.trigger_barcode))
        .all(|g| selections.get(&g.trigger_barcode) == Some(program.id.as_str()))
}

// =============================================================================
// Pass State
// =============================================================================

struct Pass<'a> {
    stock: CartStock<'a>,
    consumed: HashMap<&'a str, i64>,
    rewarded: HashSet<String>,
    sections: Vec<Section>,
}

impl<'a> Pass<'a> {
    fn new(stock: CartStock<'a>) -> Self {
        Pass {
            stock,
            consumed: HashMap::new(),
            rewarded: HashSet::new(),
            sections: Vec::new(),
        }
    }

    fn available(&self, barcode: &str) -> i64 {
        let used = self.consumed.get(barcode).copied().unwrap_or(0);
        (self.stock.quantity(barcode) - used).max(0)
    }

    /// Consumes `qty` units and returns the line data, or `None` when the
    /// barcode is not in the cart.
    fn take(&mut self, barcode: &str, qty: i64) -> Option<(String, String, Money)> {
        let line = self.stock.get(barcode)?;
        let (key, name, price) = (line.barcode, line.name, line.unit_price);
        *self.consumed.entry(key).or_insert(0) += qty;
        Some((key.to_string(), name.to_string(), price))
    }

    /// Sets formable from `trigger` and `reward`, before any cap.
    fn pair_sets(&self, program: &LoyaltyProgram, trigger: &str, reward: &str) -> i64 {
        if trigger == reward {
            self.available(trigger) / program.min_quantity.saturating_add(program.reward_quantity)
        } else {
            (self.available(trigger) / program.min_quantity)
                .min(self.available(reward) / program.reward_quantity)
        }
    }

    /// Consumes one trigger/reward pairing and returns its lines.
    fn take_pair(
        &mut self,
        program: &LoyaltyProgram,
        trigger: &str,
        reward: &str,
        sets: i64,
    ) -> Option<(TriggerLine, (String, String, Money, i64))> {
        let (t_barcode, t_name, t_price) = self.take(trigger, sets * program.min_quantity)?;
        let reward_qty = sets * program.reward_quantity;
        let (r_barcode, r_name, r_price) = self.take(reward, reward_qty)?;
        self.rewarded.insert(r_barcode.clone());

        let trigger_line = TriggerLine {
            barcode: t_barcode,
            name: t_name,
            unit_price: t_price,
            consumed_qty: sets * program.min_quantity,
            line_total: t_price.multiply_quantity(sets * program.min_quantity),
        };
        Some((trigger_line, (r_barcode, r_name, r_price, reward_qty)))
    }

    // -------------------------------------------------------------------------
    // Fixed bundle
    // -------------------------------------------------------------------------

    fn apply_fixed_bundle(&mut self, program: &LoyaltyProgram) {
        let Some(bundle_price) = program.fixed_bundle_price else {
            return;
        };

        let pool: i64 = program.trigger_barcodes.iter().map(|t| self.available(t)).sum();
        let sets = cap(pool / program.min_quantity, program.max_sets);
        if sets == 0 {
            return;
        }

        let mut needed = sets * program.min_quantity;
        let mut trigger_lines = Vec::new();
        for trigger in &program.trigger_barcodes {
            if needed == 0 {
                break;
            }
            let qty = self.available(trigger).min(needed);
            if qty == 0 {
                continue;
            }
            if let Some((barcode, name, unit_price)) = self.take(trigger, qty) {
                trigger_lines.push(TriggerLine {
                    barcode,
                    name,
                    unit_price,
                    consumed_qty: qty,
                    line_total: unit_price.multiply_quantity(qty),
                });
                needed -= qty;
            }
        }

        let gross: Money = trigger_lines.iter().map(|l| l.line_total).sum();
        let net = bundle_price.multiply_quantity(sets);
        let total_discount = (gross - net).non_negative();

        debug!(program = %program.id, sets, %gross, %total_discount, "Fixed bundle applied");
        self.sections.push(Section {
            program_id: program.id.clone(),
            program_name: program.name.clone(),
            program_type: program.program_type,
            discount_percent: total_discount.percent_of(gross),
            sets,
            trigger_lines,
            reward_lines: Vec::new(),
            section_subtotal: (gross - total_discount).non_negative(),
            total_discount,
        });
    }

    // -------------------------------------------------------------------------
    // Percent discount
    // -------------------------------------------------------------------------

    fn apply_percent_discount(&mut self, program: &LoyaltyProgram) {
        let Some(trigger) = self.first_trigger(program) else {
            return;
        };

        let mut sets_left = program.max_sets;
        for reward in &program.reward_barcodes {
            if program.max_sets > 0 && sets_left == 0 {
                break;
            }
            if self.rewarded.contains(reward) {
                continue;
            }

            let sets = cap(self.pair_sets(program, &trigger, reward), sets_left);
            if sets == 0 {
                continue;
            }
            let Some((trigger_line, (barcode, name, unit_price, qty))) =
                self.take_pair(program, &trigger, reward, sets)
            else {
                continue;
            };
            sets_left -= sets;

            let discount_amount = unit_price
                .multiply_quantity(qty)
                .percent(program.discount_percent)
                .non_negative();
            let reward_line = RewardLine {
                barcode,
                name,
                unit_price,
                consumed_qty: qty,
                free_qty: 0,
                discount_amount,
            };

            debug!(program = %program.id, reward = %reward_line.barcode, sets, "Percent discount applied");
            self.push_section(program, program.discount_percent, sets, trigger_line, reward_line);
        }
    }

    // -------------------------------------------------------------------------
    // Buy X get Y
    // -------------------------------------------------------------------------

    fn apply_buy_x_get_y(&mut self, program: &LoyaltyProgram) {
        for trigger in &program.trigger_barcodes {
            if self.available(trigger) < program.min_quantity {
                continue;
            }

            for reward in &program.reward_barcodes {
                if self.rewarded.contains(reward) {
                    continue;
                }

                let sets = cap(self.pair_sets(program, trigger, reward), program.max_sets);
                if sets == 0 {
                    continue;
                }
                let Some((trigger_line, (barcode, name, unit_price, qty))) =
                    self.take_pair(program, trigger, reward, sets)
                else {
                    continue;
                };

                let reward_line = RewardLine {
                    barcode,
                    name,
                    unit_price,
                    consumed_qty: qty,
                    free_qty: qty,
                    discount_amount: unit_price.multiply_quantity(qty),
                };

                debug!(program = %program.id, trigger = %trigger, reward = %reward, sets, "Buy X get Y applied");
                // Effective rate over everything the section consumed
                let discount_percent = reward_line
                    .discount_amount
                    .percent_of(trigger_line.line_total + reward_line.gross());
                self.push_section(program, discount_percent, sets, trigger_line, reward_line);
                return;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn first_trigger(&self, program: &LoyaltyProgram) -> Option<String> {
        program
            .trigger_barcodes
            .iter()
            .find(|t| self.available(t) >= program.min_quantity)
            .cloned()
    }

    fn push_section(
        &mut self,
        program: &LoyaltyProgram,
        discount_percent: Decimal,
        sets: i64,
        trigger_line: TriggerLine,
        reward_line: RewardLine,
    ) {
        let gross = trigger_line.line_total + reward_line.gross();
        let total_discount = reward_line.discount_amount;

        self.sections.push(Section {
            program_id: program.id.clone(),
            program_name: program.name.clone(),
            program_type: program.program_type,
            discount_percent,
            sets,
            trigger_lines: vec![trigger_line],
            reward_lines: vec![reward_line],
            section_subtotal: (gross - total_discount).non_negative(),
            total_discount,
        });
    }

    fn finish(self) -> Allocation {
        let remaining_items = self
            .stock
            .lines()
            .iter()
            .filter_map(|line| {
                let quantity = self.available(line.barcode);
                (quantity > 0).then(|| RemainingItem {
                    barcode: line.barcode.to_string(),
                    name: line.name.to_string(),
                    unit_price: line.unit_price,
                    quantity,
                    line_subtotal: line.unit_price.multiply_quantity(quantity),
                })
            })
            .collect();

        Allocation {
            sections: self.sections,
            remaining_items,
        }
    }
}

/// Applies a `max_sets`-style cap (0 = unlimited).
fn cap(sets: i64, max_sets: i64) -> i64 {
    let capped = if max_sets > 0 { sets.min(max_sets) } else { sets };
    capped.max(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Property-based tests for the allocation pass.
//!
//! Random carts and catalogs over a small barcode pool, so programs overlap
//! often: conservation, non-negativity, no double reward, idempotence.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rust_decimal::Decimal;

use till_core::{
    allocate, detect_conflicts, price_cart, Allocation, Cart, CartLine, Catalog, LoyaltyProgram, Money,
    SelectionStore, TaxRate,
};

const BARCODES: [&str; 4] = ["A", "B", "C", "D"];

fn barcode_subset() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(0usize..BARCODES.len(), 1..3).prop_map(|idx| idx.into_iter().map(|i| BARCODES[i]).collect())
}

fn cart_strategy() -> impl Strategy<Value = Cart> {
    prop::collection::vec((0usize..BARCODES.len(), 0i64..12, 1i64..2_000), 0..6).prop_map(|lines| {
        Cart::from_lines(
            lines
                .into_iter()
                .map(|(i, qty, cents)| CartLine::new(BARCODES[i], BARCODES[i], qty, Money::from_cents(cents)))
                .collect(),
        )
    })
}

fn program_strategy() -> impl Strategy<Value = LoyaltyProgram> {
    (
        0u8..3,
        barcode_subset(),
        barcode_subset(),
        1i64..4,
        1i64..3,
        0i64..3,
        0u32..=100,
        1i64..3_000,
    )
        .prop_map(|(kind, triggers, rewards, min, reward_qty, max_sets, pct, bundle_cents)| {
            let program = match kind {
                0 => LoyaltyProgram::buy_x_get_y("", "", &triggers, &rewards, min, reward_qty),
                1 => LoyaltyProgram::percent_discount("", "", &triggers, &rewards, min, reward_qty, Decimal::from(pct)),
                _ => LoyaltyProgram::fixed_bundle("", "", &triggers, min, Money::from_cents(bundle_cents)),
            };
            program.with_max_sets(max_sets)
        })
}

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(program_strategy(), 0..5).prop_map(|programs| {
        Catalog::from_programs(
            programs
                .into_iter()
                .enumerate()
                .map(|(i, mut p)| {
                    p.id = format!("P{i}");
                    p.name = format!("Program {i}");
                    p
                })
                .collect(),
        )
    })
}

/// Picks the `choice`-th option (mod count) for every conflict.
fn resolve_all(cart: &Cart, catalog: &Catalog, choice: usize) -> SelectionStore {
    let conflicts = detect_conflicts(cart, catalog);
    let mut selections = SelectionStore::new();
    for group in &conflicts {
        let option = &group.options[choice % group.options.len()];
        selections
            .select(&conflicts, &group.trigger_barcode, &option.program_id)
            .unwrap();
    }
    selections
}

fn run(cart: &Cart, catalog: &Catalog, selections: &SelectionStore) -> Allocation {
    let conflicts = detect_conflicts(cart, catalog);
    allocate(cart, catalog, &conflicts, selections)
}

fn cart_quantities(cart: &Cart) -> HashMap<String, i64> {
    let mut quantities = HashMap::new();
    for line in &cart.lines {
        *quantities.entry(line.barcode.clone()).or_insert(0) += line.quantity.max(0);
    }
    quantities
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn units_are_conserved(cart in cart_strategy(), catalog in catalog_strategy(), choice in 0usize..4) {
        let selections = resolve_all(&cart, &catalog, choice);
        let allocation = run(&cart, &catalog, &selections);

        for (barcode, qty) in cart_quantities(&cart) {
            prop_assert_eq!(
                allocation.consumed_quantity(&barcode) + allocation.remaining_quantity(&barcode),
                qty,
                "barcode {}", barcode
            );
        }
    }

    #[test]
    fn amounts_are_non_negative(cart in cart_strategy(), catalog in catalog_strategy(), choice in 0usize..4) {
        let selections = resolve_all(&cart, &catalog, choice);
        let pricing = price_cart(&cart, &catalog, &selections, TaxRate::from_bps(1500));

        for section in &pricing.sections {
            prop_assert!(!section.total_discount.is_negative());
            prop_assert!(!section.section_subtotal.is_negative());
            prop_assert!(section.sets > 0);
        }
        for item in &pricing.remaining_items {
            prop_assert!(item.quantity > 0);
        }
        let totals = pricing.totals;
        prop_assert!(!totals.total_discount.is_negative());
        prop_assert!(!totals.total_tax.is_negative());
        prop_assert!(!totals.total.is_negative());
        prop_assert!(totals.total_tax <= totals.total);
        prop_assert_eq!(totals.total, totals.subtotal - totals.total_discount);
    }

    #[test]
    fn rewards_are_granted_once(cart in cart_strategy(), catalog in catalog_strategy(), choice in 0usize..4) {
        let selections = resolve_all(&cart, &catalog, choice);
        let allocation = run(&cart, &catalog, &selections);

        let mut seen = HashSet::new();
        for line in allocation.sections.iter().flat_map(|s| &s.reward_lines) {
            prop_assert!(seen.insert(line.barcode.clone()), "{} rewarded twice", line.barcode);
        }
    }

    #[test]
    fn pricing_is_idempotent(cart in cart_strategy(), catalog in catalog_strategy(), choice in 0usize..4) {
        let selections = resolve_all(&cart, &catalog, choice);

        let first = price_cart(&cart, &catalog, &selections, TaxRate::from_bps(1500));
        let second = price_cart(&cart, &catalog, &selections, TaxRate::from_bps(1500));

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn resolved_carts_have_no_unresolved_conflicts(cart in cart_strategy(), catalog in catalog_strategy(), choice in 0usize..4) {
        let selections = resolve_all(&cart, &catalog, choice);
        let pricing = price_cart(&cart, &catalog, &selections, TaxRate::zero());
        prop_assert!(pricing.is_resolved());
    }
}

//! # till-core: Promotion Engine for Till POS
//!
//! This crate holds the checkout pricing logic: catalog normalization,
//! promotion conflict detection, section allocation and totals. It is pure,
//! with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │         Register front end / customer display / receipts        │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ JSON (CartPricing, OrderDraft)         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                  till-checkout (app commands)                   │    │
//! │  │      add / qty / remove / select / show / checkout              │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                ★ till-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │  catalog ──► conflict ──► selection ──► allocation ──► totals   │    │
//! │  │                                              │                  │    │
//! │  │                      pricing (pipeline) ◄────┘ ──► order        │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO GLOBAL STATE • SAME INPUT = SAME OUTPUT           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Reference data (Product, TaxRate)
//! - [`money`] - Decimal money, rounded only for presentation
//! - [`cart`] - Cart lines and edits
//! - [`catalog`] - Loyalty programs and the record normalizer
//! - [`conflict`] - Programs competing for the same trigger product
//! - [`selection`] - The cashier's per-conflict program choices
//! - [`allocation`] - Greedy section allocation
//! - [`totals`] - Subtotal, discount, VAT, total
//! - [`pricing`] - The full pass, plus checkout finalization
//! - [`order`] - Per-line promotion annotation for order submission
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{price_cart, Cart, CartLine, Catalog, LoyaltyProgram, Money, SelectionStore, TaxRate};
//!
//! let catalog = Catalog::from_programs(vec![
//!     LoyaltyProgram::buy_x_get_y("P1", "Buy 2 Get 1", &["A"], &["A"], 2, 1),
//! ]);
//! let cart = Cart::from_lines(vec![CartLine::new("A", "Apple", 3, Money::from_cents(1000))]);
//!
//! let pricing = price_cart(&cart, &catalog, &SelectionStore::new(), TaxRate::from_bps(1500));
//!
//! assert_eq!(pricing.sections.len(), 1);
//! assert_eq!(pricing.totals.total_discount.cents(), 1000);
//! assert_eq!(pricing.totals.total.cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod cart;
pub mod catalog;
pub mod conflict;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod selection;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{allocate, Allocation, RemainingItem, RewardLine, Section, TriggerLine};
pub use cart::{Cart, CartLine};
pub use catalog::{Catalog, ExcludedRecord, ExclusionReason, LoyaltyProgram, ProgramType};
pub use conflict::{detect_conflicts, ConflictGroup, ConflictOption};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{annotate_order_lines, CustomerInfo, OrderDraft, OrderLine, PaymentMethod};
pub use pricing::{finalize_checkout, price_cart, CartPricing};
pub use selection::SelectionStore;
pub use totals::{compute_totals, Totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Catches keypad slips (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit or bundle price accepted from a snapshot, in minor units.
///
/// Keeps `price * MAX_ITEM_QUANTITY * MAX_CART_ITEMS` far inside the decimal
/// range.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000_000;

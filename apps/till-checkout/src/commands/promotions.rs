//! # Promotion Commands
//!
//! Conflict listing and the cashier's promotion choice.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart: Burger x3, Fries x1, Cola x1                                     │
//! │                                                                         │
//! │  get_conflicts() ──► [ Burger: "Burgers with fries" (saves 5.00)        │
//! │                                "Burgers with cola"  (saves 3.00) ]      │
//! │                                                                         │
//! │  Customer wants the fries                                               │
//! │                                                                         │
//! │  select_promotion("BURGER", "P1") ──► re-priced cart, conflict resolved │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use till_core::{detect_conflicts, ConflictGroup, LoyaltyProgram};

use super::{reprice, CartResponse};
use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState};

/// Lists the conflict groups for the current cart.
pub fn get_conflicts(catalog: &CatalogState, cart: &CartState) -> Vec<ConflictGroup> {
    debug!("get_conflicts command");
    cart.read(|s| detect_conflicts(&s.cart, catalog.catalog()))
}

/// Records the cashier's program choice for a conflicted trigger.
pub fn select_promotion(
    catalog: &CatalogState,
    cart: &CartState,
    config: &ConfigState,
    trigger_barcode: &str,
    program_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(trigger = %trigger_barcode, program = %program_id, "select_promotion command");

    cart.write(|s| {
        let conflicts = detect_conflicts(&s.cart, catalog.catalog());
        s.selections.select(&conflicts, trigger_barcode, program_id)?;
        Ok::<_, ApiError>(reprice(s, catalog, config))
    })
}

/// Lists the active loyalty programs.
pub fn list_programs(catalog: &CatalogState) -> Vec<LoyaltyProgram> {
    catalog.catalog().active_programs().cloned().collect()
}

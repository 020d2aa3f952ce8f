//! # Selection Store
//!
//! The cashier's choice of program per conflicted trigger barcode.
//!
//! ## Lifecycle
//! ```text
//! detect_conflicts ──► ConflictGroup(A: [P1, P2])
//!                           │
//!        cashier picks P2 ──► select(&conflicts, "A", "P2")   (validated write)
//!                           │
//!        every later pass ──► allocate(.., &selections)       (read only)
//!                           │
//!     cart edit removes C ──► prune(&conflicts)               (entry for A dropped)
//! ```
//!
//! The engine never writes here. Writes are explicit calls by the register.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::conflict::ConflictGroup;
use crate::error::{CoreError, CoreResult};

/// Trigger barcode → chosen program id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectionStore {
    selections: BTreeMap<String, String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        SelectionStore::default()
    }

    /// Records `program_id` as the choice for `trigger_barcode`.
    ///
    /// Fails with [`CoreError::InvalidSelection`] unless the trigger has a
    /// conflict group listing that program.
    pub fn select(&mut self, conflicts: &[ConflictGroup], trigger_barcode: &str, program_id: &str) -> CoreResult<()> {
        let valid = conflicts
            .iter()
            .any(|g| g.trigger_barcode == trigger_barcode && g.has_option(program_id));
        if !valid {
            return Err(CoreError::InvalidSelection {
                trigger_barcode: trigger_barcode.to_string(),
                program_id: program_id.to_string(),
            });
        }

        debug!(trigger = trigger_barcode, program = program_id, "Promotion selected");
        self.selections
            .insert(trigger_barcode.to_string(), program_id.to_string());
        Ok(())
    }

    /// Returns the chosen program for a trigger barcode.
    pub fn get(&self, trigger_barcode: &str) -> Option<&str> {
        self.selections.get(trigger_barcode).map(String::as_str)
    }

    /// Forgets every choice (new customer).
    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Drops entries whose conflict no longer exists or whose program is no
    /// longer an option. Returns how many were dropped.
    pub fn prune(&mut self, conflicts: &[ConflictGroup]) -> usize {
        let before = self.selections.len();
        self.selections.retain(|trigger, program| {
            conflicts
                .iter()
                .any(|g| &g.trigger_barcode == trigger && g.has_option(program))
        });

        let dropped = before - self.selections.len();
        if dropped > 0 {
            debug!(dropped, "Pruned stale promotion selections");
        }
        dropped
    }

    /// Trigger barcodes of groups without a valid choice, in group order.
    pub fn unresolved(&self, conflicts: &[ConflictGroup]) -> Vec<String> {
        conflicts
            .iter()
            .filter(|g| !self.get(&g.trigger_barcode).is_some_and(|p| g.has_option(p)))
            .map(|g| g.trigger_barcode.clone())
            .collect()
    }

    /// Returns true when every conflict group has a valid choice.
    pub fn is_resolved(&self, conflicts: &[ConflictGroup]) -> bool {
        self.unresolved(conflicts).is_empty()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

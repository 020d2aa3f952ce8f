//! # Domain Types
//!
//! Reference data shared by every stage of the pricing pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    Product      │   │    TaxRate      │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id (backend)   │   │  bps (u32)      │                              │
//! │  │  barcode (key)  │   │  1500 = 15%     │                              │
//! │  │  name           │   └─────────────────┘                              │
//! │  │  price          │                                                    │
//! │  │  tax_rate       │   Cart types live in `cart`, loyalty programs      │
//! │  │  category       │   in `catalog`, engine output in `allocation`.     │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products carry both a backend `id` (used by loyalty records that reference
//! products numerically) and a `barcode`, which is the key used everywhere
//! else in the engine.

use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15% (standard VAT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Creates a tax rate from a fraction such as `0.15`.
    ///
    /// Negative fractions clamp to zero.
    pub fn from_fraction(fraction: Decimal) -> Self {
        let bps = fraction.saturating_mul(Decimal::from(10_000u32)).round();
        TaxRate(bps.to_u32().unwrap_or_default())
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier; loyalty records may reference products by it.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,

    /// Barcode (EAN-13, UPC-A, etc.). Unique key.
    pub barcode: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit price, tax inclusive.
    pub price: Money,

    /// Tax rate as a fraction (`0.15`).
    #[serde(default)]
    #[ts(as = "String")]
    pub tax_rate: Decimal,

    /// Category label, informational only.
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_fraction(self.tax_rate)
    }
}

/// Accepts `"42"`, `42` or `null` for backend IDs.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1500);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_tax_rate_from_fraction() {
        assert_eq!(TaxRate::from_fraction(dec!(0.15)).bps(), 1500);
        assert_eq!(TaxRate::from_fraction(dec!(-0.1)).bps(), 0);
        assert_eq!(TaxRate::from_fraction(Decimal::MAX).bps(), 0);
    }

    #[test]
    fn test_product_accepts_numeric_id() {
        let json = r#"{"id": 7, "barcode": "628100", "name": "Water", "price": 1.5, "taxRate": 0.15}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_deref(), Some("7"));
        assert_eq!(product.price, Money::from_cents(150));
        assert_eq!(product.tax_rate().bps(), 1500);
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_product_without_id() {
        let json = r#"{"barcode": "628100", "name": "Water", "price": "1.50"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, None);
        assert!(product.tax_rate().is_zero());
    }
}

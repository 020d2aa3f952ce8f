//! # Loyalty Catalog
//!
//! Canonical loyalty programs and the normalizer that produces them.
//!
//! ## Normalization Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Normalization (once per load)                │
//! │                                                                         │
//! │  Backend JSON records                                                   │
//! │  { "loyaltyName": "Buy 2 Get 1", "type": 1,                             │
//! │    "triggerProductIds": "17, 18", "rewardProductIds": "19",             │
//! │    "buyQuantity": "2", "maxQuantity": 0 }                               │
//! │         │                                                               │
//! │         ▼  FIELD_ALIASES: one lookup table, no per-use branching        │
//! │  canonical fields                                                       │
//! │         │                                                               │
//! │         ▼  ProductIndex: "17" → "6281007041155" (else raw token)        │
//! │  barcodes                                                               │
//! │         │                                                               │
//! │         ▼  defaults, clamping, has_distinct_rewards                     │
//! │  LoyaltyProgram ──► Catalog        (inert records ──► excluded list)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalization never fails. A record the engine cannot use is recorded in
//! [`Catalog::excluded`] with the reason and logged at `warn`.

use std::collections::HashMap;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_price;

// =============================================================================
// Program Type
// =============================================================================

/// The kind of loyalty program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramType {
    /// Percentage off reward units, or a fixed price per bundle.
    PercentDiscount,
    /// Reward units are free.
    BuyXGetY,
}

impl ProgramType {
    /// Allocation priority; buy-X-get-Y runs before percentage programs.
    pub(crate) fn priority(self) -> u8 {
        match self {
            ProgramType::BuyXGetY => 0,
            ProgramType::PercentDiscount => 1,
        }
    }

    fn parse(value: &Value) -> Option<Self> {
        if let Some(n) = value.as_i64() {
            return match n {
                0 => Some(ProgramType::PercentDiscount),
                1 => Some(ProgramType::BuyXGetY),
                _ => None,
            };
        }

        let normalized = value
            .as_str()?
            .trim()
            .to_ascii_uppercase()
            .replace(['-', ' '], "_");

        match normalized.as_str() {
            "1" | "BUY_X_GET_Y" | "BUYXGETY" | "BOGO" => Some(ProgramType::BuyXGetY),
            "0" | "PERCENT_DISCOUNT" | "DISCOUNT" | "PERCENT" | "PERCENTAGE" | "FIXED"
            | "FIXED_BUNDLE" | "BUNDLE" => Some(ProgramType::PercentDiscount),
            _ => None,
        }
    }
}

// =============================================================================
// Loyalty Program
// =============================================================================

/// A canonical loyalty program.
///
/// ## Quantities
/// - `min_quantity`: trigger units per set (≥ 1)
/// - `reward_quantity`: reward units per set (≥ 1)
/// - `max_sets`: sets per checkout, 0 = unlimited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyProgram {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    pub trigger_barcodes: Vec<String>,
    pub reward_barcodes: Vec<String>,
    pub min_quantity: i64,
    pub max_sets: i64,
    pub reward_quantity: i64,
    #[ts(as = "String")]
    pub discount_percent: Decimal,
    pub fixed_bundle_price: Option<Money>,
    /// True when some reward barcode is not also a trigger barcode.
    ///
    /// Programs without distinct rewards are same-product offers
    /// ("buy 2 get 1 of the same") and never take part in conflicts.
    pub has_distinct_rewards: bool,
}

impl LoyaltyProgram {
    fn base(id: &str, name: &str, program_type: ProgramType, triggers: &[&str], rewards: &[&str]) -> Self {
        let mut program = LoyaltyProgram {
            id: id.to_string(),
            name: name.to_string(),
            active: true,
            program_type,
            trigger_barcodes: ordered_set(triggers.iter().map(|s| s.to_string())),
            reward_barcodes: ordered_set(rewards.iter().map(|s| s.to_string())),
            min_quantity: 1,
            max_sets: 0,
            reward_quantity: 1,
            discount_percent: Decimal::ZERO,
            fixed_bundle_price: None,
            has_distinct_rewards: false,
        };
        program.has_distinct_rewards = program.compute_distinct_rewards();
        program
    }

    /// A "buy `min_quantity` trigger units, get `reward_quantity` reward units
    /// free" program.
    pub fn buy_x_get_y(
        id: &str,
        name: &str,
        triggers: &[&str],
        rewards: &[&str],
        min_quantity: i64,
        reward_quantity: i64,
    ) -> Self {
        let mut program = Self::base(id, name, ProgramType::BuyXGetY, triggers, rewards);
        program.min_quantity = min_quantity.max(1);
        program.reward_quantity = reward_quantity.max(1);
        program
    }

    /// A "buy `min_quantity` trigger units, get `percent`% off
    /// `reward_quantity` reward units" program.
    pub fn percent_discount(
        id: &str,
        name: &str,
        triggers: &[&str],
        rewards: &[&str],
        min_quantity: i64,
        reward_quantity: i64,
        percent: Decimal,
    ) -> Self {
        let mut program = Self::base(id, name, ProgramType::PercentDiscount, triggers, rewards);
        program.min_quantity = min_quantity.max(1);
        program.reward_quantity = reward_quantity.max(1);
        program.discount_percent = clamp_percent(percent);
        program
    }

    /// "`min_quantity` trigger units for `price`" bundle pricing.
    pub fn fixed_bundle(id: &str, name: &str, triggers: &[&str], min_quantity: i64, price: Money) -> Self {
        let mut program = Self::base(id, name, ProgramType::PercentDiscount, triggers, &[]);
        program.min_quantity = min_quantity.max(1);
        program.fixed_bundle_price = Some(price);
        program
    }

    /// Caps the number of sets per checkout (0 = unlimited).
    pub fn with_max_sets(mut self, max_sets: i64) -> Self {
        self.max_sets = max_sets.max(0);
        self
    }

    /// Marks the program inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns true for bundle pricing (`PERCENT_DISCOUNT` with a fixed price).
    pub fn is_fixed_bundle(&self) -> bool {
        self.program_type == ProgramType::PercentDiscount && self.fixed_bundle_price.is_some()
    }

    /// Returns true when `barcode` is one of the trigger barcodes.
    pub fn has_trigger(&self, barcode: &str) -> bool {
        self.trigger_barcodes.iter().any(|t| t == barcode)
    }

    /// Returns why the program cannot take part in allocation, if anything.
    pub fn inert_reason(&self) -> Option<ExclusionReason> {
        if self.trigger_barcodes.is_empty() {
            return Some(ExclusionReason::NoTriggers);
        }
        if !self.is_fixed_bundle() && self.reward_barcodes.is_empty() {
            return Some(ExclusionReason::NoRewards);
        }
        if self.fixed_bundle_price.is_some_and(|p| validate_price(p).is_err()) {
            return Some(ExclusionReason::PriceOutOfRange);
        }
        None
    }

    fn compute_distinct_rewards(&self) -> bool {
        self.reward_barcodes.iter().any(|r| !self.has_trigger(r))
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Why a raw record was left out of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    /// The record is not a JSON object.
    NotAnObject,
    /// Neither an id nor a name was present.
    MissingIdentity,
    /// The program type is missing or unrecognized.
    UnknownType,
    /// The trigger list is empty.
    NoTriggers,
    /// The reward list is empty and the program is not a fixed bundle.
    NoRewards,
    /// The fixed bundle price is beyond the accepted price range.
    PriceOutOfRange,
}

/// A raw record the normalizer dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedRecord {
    /// Position in the raw record list.
    pub index: usize,
    pub id: Option<String>,
    pub reason: ExclusionReason,
}

/// The normalized, read-only loyalty catalog, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    programs: Vec<LoyaltyProgram>,
    #[serde(default)]
    excluded: Vec<ExcludedRecord>,
}

impl Catalog {
    /// Builds a catalog from canonical programs, dropping inert ones.
    pub fn from_programs(programs: Vec<LoyaltyProgram>) -> Self {
        let mut catalog = Catalog::default();
        for (index, mut program) in programs.into_iter().enumerate() {
            program.has_distinct_rewards = program.compute_distinct_rewards();
            catalog.push(index, program);
        }
        catalog
    }

    /// Normalizes raw backend records into a catalog.
    ///
    /// `products` is used only to resolve numeric product IDs to barcodes.
    pub fn normalize(records: &[Value], products: &[Product]) -> Self {
        let index = ProductIndex::new(products);
        let mut catalog = Catalog::default();

        for (position, record) in records.iter().enumerate() {
            match normalize_record(record, &index) {
                Ok(program) => catalog.push(position, program),
                Err((id, reason)) => catalog.exclude(position, id, reason),
            }
        }

        debug!(
            programs = catalog.programs.len(),
            excluded = catalog.excluded.len(),
            "Loyalty catalog normalized"
        );
        catalog
    }

    fn push(&mut self, index: usize, program: LoyaltyProgram) {
        match program.inert_reason() {
            Some(reason) => self.exclude(index, Some(program.id), reason),
            None => self.programs.push(program),
        }
    }

    fn exclude(&mut self, index: usize, id: Option<String>, reason: ExclusionReason) {
        warn!(index, id = ?id, ?reason, "Excluding loyalty record");
        self.excluded.push(ExcludedRecord { index, id, reason });
    }

    /// Usable programs in catalog order (active and inactive).
    pub fn programs(&self) -> &[LoyaltyProgram] {
        &self.programs
    }

    /// Records dropped during normalization.
    pub fn excluded(&self) -> &[ExcludedRecord] {
        &self.excluded
    }

    /// Active programs in catalog order.
    pub fn active_programs(&self) -> impl Iterator<Item = &LoyaltyProgram> {
        self.programs.iter().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

// =============================================================================
// Field Alias Table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Name,
    Active,
    Type,
    Triggers,
    Rewards,
    MinQuantity,
    RewardQuantity,
    MaxSets,
    DiscountPercent,
    DiscountKind,
    FixedPrice,
}

/// Every spelling the backend and spreadsheet imports have used, per field.
/// First present, non-null alias wins.
const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (Field::Id, &["id", "loyaltyId", "programId", "ID"]),
    (Field::Name, &["name", "loyaltyName", "programName", "Name"]),
    (Field::Active, &["active", "isActive", "is_active", "enabled"]),
    (Field::Type, &["type", "loyaltyType", "programType"]),
    (
        Field::Triggers,
        &["triggerProductIds", "triggerBarcodes", "trigger_product_ids", "triggerProducts"],
    ),
    (
        Field::Rewards,
        &["rewardProductIds", "rewardBarcodes", "reward_product_ids", "rewardProducts"],
    ),
    (Field::MinQuantity, &["minQuantity", "min_quantity", "buyQuantity"]),
    (Field::RewardQuantity, &["rewardQuantity", "reward_quantity", "freeQuantity"]),
    (Field::MaxSets, &["maxSets", "maxQuantity", "max_quantity", "maxUses"]),
    (Field::DiscountPercent, &["discountPercent", "discount_percent", "percentage"]),
    (Field::DiscountKind, &["discountType", "discount_type"]),
    (
        Field::FixedPrice,
        &["fixedBundlePrice", "fixedPrice", "bundlePrice", "fixed_price"],
    ),
];

struct RawRecord<'a>(&'a Map<String, Value>);

impl<'a> RawRecord<'a> {
    fn get(&self, field: Field) -> Option<&'a Value> {
        let aliases = FIELD_ALIASES
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| *aliases)
            .unwrap_or_default();

        aliases
            .iter()
            .filter_map(|alias| self.0.get(*alias))
            .find(|v| !v.is_null())
    }

    fn string(&self, field: Field) -> Option<String> {
        self.get(field).and_then(value_to_string)
    }

    fn int(&self, field: Field) -> Option<i64> {
        self.get(field).and_then(value_to_decimal).and_then(|d| d.trunc().to_i64())
    }

    fn decimal(&self, field: Field) -> Option<Decimal> {
        self.get(field).and_then(value_to_decimal)
    }
}

// =============================================================================
// Product ID Resolution
// =============================================================================

/// Backend product id → barcode, built once per normalization.
struct ProductIndex<'a> {
    by_id: HashMap<&'a str, &'a str>,
}

impl<'a> ProductIndex<'a> {
    fn new(products: &'a [Product]) -> Self {
        let by_id = products
            .iter()
            .filter_map(|p| p.id.as_deref().map(|id| (id, p.barcode.as_str())))
            .collect();
        ProductIndex { by_id }
    }

    /// Resolves an id token to a barcode, falling back to the token itself.
    fn resolve(&self, token: &str) -> String {
        self.by_id.get(token).copied().unwrap_or(token).to_string()
    }

    fn resolve_list(&self, value: Option<&Value>) -> Vec<String> {
        let tokens: Vec<String> = match value {
            Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
            Some(other) => value_to_string(other)
                .map(|s| s.split(',').map(|t| t.trim().to_string()).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        };

        ordered_set(
            tokens
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| self.resolve(t)),
        )
    }
}

// =============================================================================
// Record Normalization
// =============================================================================

fn normalize_record(
    record: &Value,
    index: &ProductIndex<'_>,
) -> Result<LoyaltyProgram, (Option<String>, ExclusionReason)> {
    let Some(map) = record.as_object() else {
        return Err((None, ExclusionReason::NotAnObject));
    };
    let raw = RawRecord(map);

    let name = raw.string(Field::Name).unwrap_or_default();
    let id = raw
        .string(Field::Id)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| name.clone());
    if id.is_empty() {
        return Err((None, ExclusionReason::MissingIdentity));
    }

    let Some(program_type) = raw.get(Field::Type).and_then(ProgramType::parse).or_else(|| {
        // Bundle records from the spreadsheet import carry no type column.
        fixed_price(&raw).map(|_| ProgramType::PercentDiscount)
    }) else {
        return Err((Some(id), ExclusionReason::UnknownType));
    };

    let fixed_bundle_price = match program_type {
        ProgramType::PercentDiscount => fixed_price(&raw),
        ProgramType::BuyXGetY => None,
    };

    let trigger_barcodes = index.resolve_list(raw.get(Field::Triggers));
    let reward_barcodes = index.resolve_list(raw.get(Field::Rewards));

    let mut program = LoyaltyProgram {
        name: if name.is_empty() { id.clone() } else { name },
        id,
        active: raw.get(Field::Active).map(value_to_bool).unwrap_or(true),
        program_type,
        trigger_barcodes,
        reward_barcodes,
        min_quantity: raw.int(Field::MinQuantity).filter(|q| *q >= 1).unwrap_or(1),
        max_sets: raw.int(Field::MaxSets).filter(|q| *q >= 0).unwrap_or(0),
        reward_quantity: raw.int(Field::RewardQuantity).filter(|q| *q >= 1).unwrap_or(1),
        discount_percent: raw
            .decimal(Field::DiscountPercent)
            .map(clamp_percent)
            .unwrap_or(Decimal::ZERO),
        fixed_bundle_price,
        has_distinct_rewards: false,
    };
    program.has_distinct_rewards = program.compute_distinct_rewards();

    Ok(program)
}

/// A positive fixed price, when the record describes bundle pricing.
fn fixed_price(raw: &RawRecord<'_>) -> Option<Money> {
    let price = raw.decimal(Field::FixedPrice).filter(|p| *p > Decimal::ZERO);
    let kind_is_fixed = raw
        .string(Field::DiscountKind)
        .map(|k| k.eq_ignore_ascii_case("fixed"))
        .unwrap_or(false);
    let kind_is_percent = raw
        .string(Field::DiscountKind)
        .map(|k| k.eq_ignore_ascii_case("percent") || k.eq_ignore_ascii_case("percentage"))
        .unwrap_or(false);

    if kind_is_percent {
        return None;
    }
    if kind_is_fixed || price.is_some() {
        return price.map(Money::from_decimal);
    }
    None
}

fn clamp_percent(percent: Decimal) -> Decimal {
    percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

fn ordered_set(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn value_to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "active"
        ),
        _ => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn products() -> Vec<Product> {
        vec![
            Product {
                id: Some("17".to_string()),
                barcode: "6281000000017".to_string(),
                name: "Burger".to_string(),
                price: Money::from_cents(1500),
                tax_rate: dec!(0.15),
                category: None,
            },
            Product {
                id: Some("18".to_string()),
                barcode: "6281000000018".to_string(),
                name: "Fries".to_string(),
                price: Money::from_cents(500),
                tax_rate: dec!(0.15),
                category: None,
            },
        ]
    }

    #[test]
    fn test_canonical_record() {
        let records = vec![json!({
            "id": "P1",
            "name": "Buy 2 Burgers Get Fries",
            "active": true,
            "type": "BUY_X_GET_Y",
            "triggerBarcodes": "6281000000017",
            "rewardBarcodes": "6281000000018",
            "minQuantity": 2,
            "rewardQuantity": 1,
            "maxSets": 3
        })];

        let catalog = Catalog::normalize(&records, &products());
        assert_eq!(catalog.len(), 1);

        let program = &catalog.programs()[0];
        assert_eq!(program.id, "P1");
        assert_eq!(program.program_type, ProgramType::BuyXGetY);
        assert_eq!(program.min_quantity, 2);
        assert_eq!(program.max_sets, 3);
        assert!(program.has_distinct_rewards);
    }

    #[test]
    fn test_alias_spellings_and_id_resolution() {
        let records = vec![json!({
            "loyaltyName": "Fries Deal",
            "type": 1,
            "triggerProductIds": "17, 99999",
            "rewardProductIds": "18",
            "buyQuantity": "2",
            "maxQuantity": 0,
            "isActive": "true"
        })];

        let catalog = Catalog::normalize(&records, &products());
        let program = &catalog.programs()[0];

        // id falls back to the name
        assert_eq!(program.id, "Fries Deal");
        // "17" resolves through the product list, "99999" is kept as a barcode
        assert_eq!(program.trigger_barcodes, vec!["6281000000017", "99999"]);
        assert_eq!(program.reward_barcodes, vec!["6281000000018"]);
        assert_eq!(program.min_quantity, 2);
        assert_eq!(program.reward_quantity, 1);
        assert!(program.active);
    }

    #[test]
    fn test_defaults_for_missing_numbers() {
        let records = vec![json!({
            "id": 5,
            "name": "10% off fries",
            "type": 0,
            "triggerProductIds": "17",
            "rewardProductIds": "18",
            "discountPercent": "10"
        })];

        let catalog = Catalog::normalize(&records, &products());
        let program = &catalog.programs()[0];
        assert_eq!(program.id, "5");
        assert_eq!(program.min_quantity, 1);
        assert_eq!(program.reward_quantity, 1);
        assert_eq!(program.max_sets, 0);
        assert_eq!(program.discount_percent, dec!(10));
        assert!(program.fixed_bundle_price.is_none());
    }

    #[test]
    fn test_fixed_bundle_record() {
        let records = vec![json!({
            "id": "B8",
            "name": "8 for 10.95",
            "type": "PERCENT_DISCOUNT",
            "discountType": "fixed",
            "triggerProductIds": "A",
            "minQuantity": 8,
            "fixedBundlePrice": 10.95
        })];

        let catalog = Catalog::normalize(&records, &[]);
        let program = &catalog.programs()[0];
        assert!(program.is_fixed_bundle());
        assert_eq!(program.fixed_bundle_price, Some(Money::from_decimal(dec!(10.95))));
        assert!(program.reward_barcodes.is_empty());
        assert!(!program.has_distinct_rewards);
    }

    #[test]
    fn test_inert_records_are_excluded_not_raised() {
        let records = vec![
            json!("not an object"),
            json!({ "id": "NT", "type": 1, "rewardProductIds": "18" }),
            json!({ "id": "NR", "type": 1, "triggerProductIds": "17" }),
            json!({ "id": "UT", "type": "LOTTERY", "triggerProductIds": "17", "rewardProductIds": "18" }),
            json!({ "type": 1, "triggerProductIds": "17", "rewardProductIds": "18" }),
            json!({ "id": "OK", "type": 1, "triggerProductIds": "17", "rewardProductIds": "18" }),
        ];

        let catalog = Catalog::normalize(&records, &products());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.programs()[0].id, "OK");

        let reasons: Vec<ExclusionReason> = catalog.excluded().iter().map(|e| e.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ExclusionReason::NotAnObject,
                ExclusionReason::NoTriggers,
                ExclusionReason::NoRewards,
                ExclusionReason::UnknownType,
                ExclusionReason::MissingIdentity,
            ]
        );
    }

    #[test]
    fn test_same_product_offer_has_no_distinct_rewards() {
        let program = LoyaltyProgram::buy_x_get_y("S", "Buy 2 Get 1", &["A"], &["A"], 2, 1);
        assert!(!program.has_distinct_rewards);

        let mixed = LoyaltyProgram::buy_x_get_y("M", "Mixed", &["A"], &["A", "B"], 2, 1);
        assert!(mixed.has_distinct_rewards);
    }

    #[test]
    fn test_percent_is_clamped_and_lists_deduplicated() {
        let records = vec![json!({
            "id": "X",
            "type": "discount",
            "triggerBarcodes": ["A", "A", "B"],
            "rewardBarcodes": "C,,C",
            "discount_percent": 150,
            "active": 0
        })];

        let catalog = Catalog::normalize(&records, &[]);
        let program = &catalog.programs()[0];
        assert_eq!(program.trigger_barcodes, vec!["A", "B"]);
        assert_eq!(program.reward_barcodes, vec!["C"]);
        assert_eq!(program.discount_percent, dec!(100));
        assert!(!program.active);
        assert_eq!(catalog.active_programs().count(), 0);
    }

    #[test]
    fn test_from_programs_drops_inert() {
        let catalog = Catalog::from_programs(vec![
            LoyaltyProgram::buy_x_get_y("E", "Empty", &[], &["B"], 1, 1),
            LoyaltyProgram::buy_x_get_y("OK", "Fine", &["A"], &["B"], 1, 1),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.programs()[0].id, "OK");
        assert_eq!(catalog.excluded()[0].reason, ExclusionReason::NoTriggers);
    }

    #[test]
    fn test_extreme_bundle_price_is_excluded() {
        let records = vec![
            json!({
                "id": "HUGE",
                "type": 0,
                "discountType": "fixed",
                "triggerProductIds": "A",
                "minQuantity": 1,
                "fixedBundlePrice": "79228162514264337593543950335"
            }),
            json!({
                "id": "FINE",
                "type": 0,
                "discountType": "fixed",
                "triggerProductIds": "A",
                "minQuantity": 1,
                "fixedBundlePrice": "9.50"
            }),
        ];

        let catalog = Catalog::normalize(&records, &[]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.programs()[0].id, "FINE");
        assert_eq!(catalog.excluded()[0].id.as_deref(), Some("HUGE"));
        assert_eq!(catalog.excluded()[0].reason, ExclusionReason::PriceOutOfRange);
    }
}

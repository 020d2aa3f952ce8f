//! # Cart
//!
//! The shopping cart snapshot the pricing pipeline runs over.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Register Action          Cart Method             Cart Change           │
//! │  ───────────────          ───────────             ───────────           │
//! │                                                                         │
//! │  Scan Product ───────────► add_product() ───────► lines.push(line)      │
//! │                                                   or quantity += n      │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity() ──────► lines[i].qty = n      │
//! │                                                   (0 removes the line)  │
//! │                                                                         │
//! │  Remove Line ────────────► remove() ────────────► lines.remove(i)       │
//! │                                                                         │
//! │  New Customer ───────────► clear() ─────────────► lines.clear()         │
//! │                                                                         │
//! │  Every change ───────────► pricing::price_cart() re-runs from scratch   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{
    validate_barcode, validate_cart_size, validate_line_quantity, validate_price, validate_quantity,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A line in the shopping cart.
///
/// ## Price Freezing
/// `unit_price` and `name` are captured when the product is first added.
/// Later catalog price changes do not affect a cart in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product barcode, unique within a cart.
    pub barcode: String,

    /// Product name at time of adding (frozen).
    #[serde(default)]
    pub name: String,

    /// Quantity in cart.
    pub quantity: i64,

    /// Unit price at time of adding (frozen).
    #[serde(alias = "price")]
    pub unit_price: Money,
}

impl CartLine {
    /// Creates a cart line.
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        CartLine {
            barcode: barcode.into(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Creates a cart line from a product and quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine::new(product.barcode.clone(), product.name.clone(), quantity, product.price)
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `barcode` (adding the same product increases quantity)
/// - Quantity is never negative; setting it to 0 removes the line
/// - Maximum lines: 100, maximum quantity per line: 999
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the order they were first added.
    #[serde(alias = "items")]
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Builds a cart from lines that are already known to be valid.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    /// Rebuilds a cart from untrusted snapshot lines.
    ///
    /// Each line is checked as if it were scanned; repeated barcodes merge
    /// into the first occurrence and keep its frozen price.
    pub fn restore(lines: Vec<CartLine>) -> CoreResult<Self> {
        let mut cart = Cart::new();
        for line in lines {
            cart.add_line(line)?;
        }
        Ok(cart)
    }

    /// Adds a product to the cart or increases quantity if already present.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.add_line(CartLine::from_product(product, quantity))
    }

    fn add_line(&mut self, new_line: CartLine) -> CoreResult<()> {
        validate_barcode(&new_line.barcode)?;
        validate_quantity(new_line.quantity)?;
        validate_price(new_line.unit_price)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.barcode == new_line.barcode) {
            let new_qty = line.quantity + new_line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge { max: MAX_CART_ITEMS })?;

        self.lines.push(new_line);
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn set_quantity(&mut self, barcode: &str, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_line_quantity(quantity)?;

        if quantity == 0 {
            return self.remove(barcode);
        }

        match self.lines.iter_mut().find(|l| l.barcode == barcode) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::NotInCart(barcode.to_string())),
        }
    }

    /// Removes a line by barcode.
    pub fn remove(&mut self, barcode: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.barcode != barcode);

        if self.lines.len() == initial_len {
            Err(CoreError::NotInCart(barcode.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up a line by barcode.
    pub fn line(&self, barcode: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.barcode == barcode)
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.quantity <= 0)
    }

    /// Aggregated per-barcode view used by the engine.
    pub(crate) fn stock(&self) -> CartStock<'_> {
        CartStock::new(self)
    }
}

// =============================================================================
// Cart Stock (engine view)
// =============================================================================

/// One barcode's aggregated cart quantity.
#[derive(Debug, Clone)]
pub(crate) struct StockLine<'a> {
    pub barcode: &'a str,
    pub name: &'a str,
    pub unit_price: Money,
    pub quantity: i64,
}

/// Cart lines aggregated by barcode, in first-appearance order.
///
/// Snapshots restored from elsewhere may repeat a barcode; quantities are
/// summed and the first line's price and name are used. Negative quantities
/// count as zero.
#[derive(Debug, Clone)]
pub(crate) struct CartStock<'a> {
    lines: Vec<StockLine<'a>>,
    index: HashMap<&'a str, usize>,
}

impl<'a> CartStock<'a> {
    fn new(cart: &'a Cart) -> Self {
        let mut lines: Vec<StockLine<'a>> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for line in &cart.lines {
            let quantity = line.quantity.max(0);
            match index.get(line.barcode.as_str()) {
                Some(&i) => lines[i].quantity = lines[i].quantity.saturating_add(quantity),
                None => {
                    index.insert(line.barcode.as_str(), lines.len());
                    lines.push(StockLine {
                        barcode: &line.barcode,
                        name: &line.name,
                        unit_price: line.unit_price,
                        quantity,
                    });
                }
            }
        }

        CartStock { lines, index }
    }

    pub fn lines(&self) -> &[StockLine<'a>] {
        &self.lines
    }

    pub fn get(&self, barcode: &str) -> Option<&StockLine<'a>> {
        self.index.get(barcode).map(|&i| &self.lines[i])
    }

    /// Cart quantity of `barcode` (0 when absent).
    pub fn quantity(&self, barcode: &str) -> i64 {
        self.get(barcode).map(|l| l.quantity).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn test_product(barcode: &str, price_cents: i64) -> Product {
        Product {
            id: None,
            barcode: barcode.to_string(),
            name: format!("Product {}", barcode),
            price: Money::from_cents(price_cents),
            tax_rate: Decimal::ZERO,
            category: None,
        }
    }

    #[test]
    fn test_cart_add_product() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 999), 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.lines[0].line_total().cents(), 1998);
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_product(&product, 2).unwrap();
        cart.add_product(&product, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_price_is_frozen() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 500);
        cart.add_product(&product, 1).unwrap();

        product.price = Money::from_cents(900);
        cart.add_product(&product, 1).unwrap();

        assert_eq!(cart.line("1").unwrap().unit_price.cents(), 500);
    }

    #[test]
    fn test_cart_quantity_limit() {
        let mut cart = Cart::new();
        let product = test_product("1", 100);
        cart.add_product(&product, 999).unwrap();

        let err = cart.add_product(&product, 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_product(&test_product(&i.to_string(), 100), 1).unwrap();
        }

        let err = cart.add_product(&test_product("overflow", 100), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 100), 3).unwrap();

        cart.set_quantity("1", 0).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(cart.set_quantity("1", 2), Err(CoreError::NotInCart(_))));
    }

    #[test]
    fn test_remove_unknown_line() {
        let mut cart = Cart::new();
        assert!(matches!(cart.remove("nope"), Err(CoreError::NotInCart(_))));
    }

    #[test]
    fn test_stock_aggregates_duplicate_barcodes() {
        let cart = Cart::from_lines(vec![
            CartLine::new("A", "Apple", 2, Money::from_cents(100)),
            CartLine::new("B", "Banana", -3, Money::from_cents(50)),
            CartLine::new("A", "Apple (2)", 3, Money::from_cents(120)),
        ]);

        let stock = cart.stock();
        assert_eq!(stock.lines().len(), 2);
        assert_eq!(stock.quantity("A"), 5);
        assert_eq!(stock.quantity("B"), 0);
        assert_eq!(stock.quantity("missing"), 0);
        assert_eq!(stock.get("A").unwrap().unit_price.cents(), 100);
        assert_eq!(stock.get("A").unwrap().name, "Apple");
    }

    #[test]
    fn test_deserialize_with_price_alias() {
        let json = r#"{"items": [{"barcode": "A", "name": "Apple", "quantity": 2, "price": 2.5}]}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.lines[0].unit_price, Money::from_cents(250));
        assert_eq!(cart.lines[0].line_total().cents(), 500);
    }

    #[test]
    fn test_restore_validates_like_scanning() {
        let cart = Cart::restore(vec![
            CartLine::new("A", "Apple", 2, Money::from_cents(100)),
            CartLine::new("B", "Banana", 1, Money::from_cents(50)),
            CartLine::new("A", "Apple (2)", 3, Money::from_cents(120)),
        ])
        .unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.line("A").unwrap().quantity, 5);
        assert_eq!(cart.line("A").unwrap().unit_price.cents(), 100);

        let bad_quantity = Cart::restore(vec![CartLine::new("A", "Apple", 0, Money::from_cents(100))]);
        assert!(matches!(bad_quantity, Err(CoreError::Validation(_))));

        let bad_barcode = Cart::restore(vec![CartLine::new("A B", "Apple", 1, Money::from_cents(100))]);
        assert!(matches!(bad_barcode, Err(CoreError::Validation(_))));

        let huge_price = "79228162514264337593543950335".parse().unwrap();
        let bad_price = Cart::restore(vec![CartLine::new("A", "Apple", 1, huge_price)]);
        assert!(matches!(bad_price, Err(CoreError::Validation(_))));

        let merged_too_far = Cart::restore(vec![
            CartLine::new("A", "Apple", 600, Money::from_cents(100)),
            CartLine::new("A", "Apple", 600, Money::from_cents(100)),
        ]);
        assert!(matches!(merged_too_far, Err(CoreError::QuantityTooLarge { .. })));

        let too_many = (0..=MAX_CART_ITEMS)
            .map(|i| CartLine::new(i.to_string(), "Item", 1, Money::from_cents(100)))
            .collect();
        assert!(matches!(Cart::restore(too_many), Err(CoreError::CartTooLarge { .. })));
    }
}

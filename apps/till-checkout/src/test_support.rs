//! Shared fixtures for command tests.

use serde_json::json;
use till_core::Product;

use crate::state::{CatalogState, ConfigState};

/// Burger, fries and cola with two competing burger deals.
pub fn burger_catalog() -> CatalogState {
    let products: Vec<Product> = serde_json::from_value(json!([
        { "id": 1, "barcode": "BURGER", "name": "Burger", "price": "15.00" },
        { "id": 2, "barcode": "FRIES",  "name": "Fries",  "price": "5.00" },
        { "id": 3, "barcode": "COLA",   "name": "Cola",   "price": "3.00" }
    ]))
    .unwrap();

    let records = vec![
        json!({ "id": "P1", "name": "Burgers with fries", "type": 1,
                "triggerProductIds": "1", "rewardProductIds": "2", "minQuantity": 2 }),
        json!({ "id": "P2", "name": "Burgers with cola", "type": 1,
                "triggerProductIds": "1", "rewardProductIds": "3", "minQuantity": 2 }),
    ];

    CatalogState::new(&records, products)
}

pub fn config() -> ConfigState {
    ConfigState {
        currency_symbol: "$".to_string(),
        ..ConfigState::default()
    }
}

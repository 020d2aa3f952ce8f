//! # Catalog State
//!
//! The product list and normalized loyalty catalog, loaded once at startup
//! from JSON snapshots exported by the back office.
//!
//! ## Snapshot Files
//! ```text
//! products.json   [ { "id": 17, "barcode": "6281000000017", "name": "Burger",
//!                     "price": "15.00", "taxRate": 0.15 }, ... ]
//!
//! loyalty.json    [ { "loyaltyName": "Burger + Fries", "type": 1,
//!                     "triggerProductIds": "17", "rewardProductIds": "18" }, ... ]
//!                 or { "programs": [ ... ] }
//! ```
//!
//! Read-only after loading, so commands share it without locking.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use till_core::{Catalog, Product};

/// Errors loading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} must contain a JSON array of {what}")]
    Shape { path: PathBuf, what: &'static str },
}

/// Products and loyalty programs for the session.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    catalog: Catalog,
    products: Vec<Product>,
    by_barcode: HashMap<String, usize>,
}

impl CatalogState {
    /// Builds state from already-parsed data.
    pub fn new(records: &[Value], products: Vec<Product>) -> Self {
        let catalog = Catalog::normalize(records, &products);
        let by_barcode = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.barcode.clone(), i))
            .collect();

        CatalogState {
            catalog,
            products,
            by_barcode,
        }
    }

    /// Loads both snapshot files.
    pub fn load(catalog_path: &Path, products_path: &Path) -> Result<Self, SnapshotError> {
        let products: Vec<Product> = serde_json::from_value(read_array(products_path, "products")?)
            .map_err(|source| SnapshotError::Json {
                path: products_path.to_path_buf(),
                source,
            })?;

        let records = match read_json(catalog_path)? {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("programs") {
                Some(Value::Array(records)) => records,
                _ => return Err(shape(catalog_path, "loyalty programs")),
            },
            _ => return Err(shape(catalog_path, "loyalty programs")),
        };

        let state = CatalogState::new(&records, products);
        info!(
            products = state.products.len(),
            programs = state.catalog.len(),
            excluded = state.catalog.excluded().len(),
            "Catalog loaded"
        );
        Ok(state)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up a product by barcode.
    pub fn product(&self, barcode: &str) -> Option<&Product> {
        self.by_barcode.get(barcode).map(|&i| &self.products[i])
    }
}

/// Reads and parses a JSON file.
pub(crate) fn read_json(path: &Path) -> Result<Value, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_array(path: &Path, what: &'static str) -> Result<Value, SnapshotError> {
    let value = read_json(path)?;
    if value.is_array() {
        Ok(value)
    } else {
        Err(shape(path, what))
    }
}

fn shape(path: &Path, what: &'static str) -> SnapshotError {
    SnapshotError::Shape {
        path: path.to_path_buf(),
        what,
    }
}

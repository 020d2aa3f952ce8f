//! # State Module
//!
//! Register state, split by concern so each command takes only what it
//! needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐       │
//! │  │  CatalogState    │  │    CartState     │  │   ConfigState    │       │
//! │  │                  │  │                  │  │                  │       │
//! │  │  products        │  │  Mutex<          │  │  store_name      │       │
//! │  │  loyalty catalog │  │   RegisterSession│  │  vat_rate_bps    │       │
//! │  │  (normalized)    │  │  > cart +        │  │  currency        │       │
//! │  │                  │  │    selections    │  │                  │       │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘       │
//! │                                                                         │
//! │  CatalogState and ConfigState are read-only after startup.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;

pub use cart::{CartState, RegisterSession};
pub use catalog::{CatalogState, SnapshotError};
pub(crate) use catalog::read_json;
pub use config::{ConfigError, ConfigState};

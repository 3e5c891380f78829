// Library Crate Root
// lib.rs

// main.rs imports through lib.rs like an external crate
pub mod api;
pub mod config;
pub mod database;
pub mod utils;

// pub use = re-export at crate root
pub use api::create_router;
pub use config::{ConfigError, StoreConfig};
pub use database::models::{Stock, Symbol};
pub use database::{StockStore, StoreError, SymbolDeletion};

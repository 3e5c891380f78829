/// Database module for the PostgreSQL-backed price store
///
/// This module provides:
/// - Connection pooling and embedded schema migrations
/// - The catalog (latest price per symbol) and history ledger schema
/// - Repository pattern implementations over both tables
/// - The `StockStore` facade that canonicalizes input and delegates to the repositories

pub mod connection;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod stock_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::{establish_connection_pool, DatabaseError, DatabasePool};
pub use errors::StoreError;
pub use stock_store::{StockStore, SymbolDeletion};

use crate::database::connection::PgPooledConnection;
use crate::database::errors::StoreError;
use crate::database::models::{CatalogEntry, NewCatalogEntry, Symbol};
use crate::database::schema::{stock_observations, stocks};
use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Catalog repository trait - one row per symbol holding its latest price
pub trait CatalogRepository: Send + Sync {
    /// All catalogued symbols, ascending
    fn list_symbols(&self) -> Result<Vec<String>, StoreError>;

    /// Find the catalog entry of a symbol
    fn find_by_symbol(&self, symbol: &Symbol) -> Result<Option<CatalogEntry>, StoreError>;

    /// Insert a new symbol; fails with `DuplicateSymbol` if it is already catalogued
    fn insert(&self, symbol: &Symbol, price: Decimal) -> Result<CatalogEntry, StoreError>;

    /// Overwrite price and last update; fails with `SymbolNotFound` when no row matched
    fn update_price(&self, symbol: &Symbol, price: Decimal) -> Result<CatalogEntry, StoreError>;

    /// Remove the catalog entry and every ledger row of the symbol in one transaction
    ///
    /// Returns the number of ledger rows removed.
    fn delete_with_history(&self, symbol: &Symbol) -> Result<usize, StoreError>;
}

/// Concrete implementation of CatalogRepository
pub struct CatalogRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, StoreError> + Send + Sync>,
}

impl CatalogRepositoryImpl {
    /// Create new catalog repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, StoreError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl CatalogRepository for CatalogRepositoryImpl {
    fn list_symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = (self.get_conn)()?;

        stocks::table
            .select(stocks::symbol)
            .order(stocks::symbol.asc())
            .load::<String>(&mut conn)
            .map_err(StoreError::QueryFailed)
    }

    fn find_by_symbol(&self, symbol: &Symbol) -> Result<Option<CatalogEntry>, StoreError> {
        let mut conn = (self.get_conn)()?;

        stocks::table
            .filter(stocks::symbol.eq(symbol.as_str()))
            .select(CatalogEntry::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StoreError::QueryFailed)
    }

    fn insert(&self, symbol: &Symbol, price: Decimal) -> Result<CatalogEntry, StoreError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(stocks::table)
            .values(&NewCatalogEntry::new(symbol, price))
            .returning(CatalogEntry::as_returning())
            .get_result(&mut conn)
            .map_err(|e| StoreError::from_insert(symbol.as_str(), e))
    }

    fn update_price(&self, symbol: &Symbol, price: Decimal) -> Result<CatalogEntry, StoreError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(stocks::table)
            .filter(stocks::symbol.eq(symbol.as_str()))
            .set((stocks::price.eq(price), stocks::last_update.eq(Utc::now())))
            .returning(CatalogEntry::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(StoreError::ExecFailed)?
            .ok_or_else(|| StoreError::SymbolNotFound(symbol.to_string()))
    }

    fn delete_with_history(&self, symbol: &Symbol) -> Result<usize, StoreError> {
        let mut conn = (self.get_conn)()?;

        // Catalog row goes first; the ledger's foreign key is deferred to commit,
        // so a failure on either statement rolls back both.
        conn.transaction::<_, StoreError, _>(|conn| {
            let removed = diesel::delete(stocks::table)
                .filter(stocks::symbol.eq(symbol.as_str()))
                .execute(conn)
                .map_err(StoreError::DeleteFailed)?;

            if removed == 0 {
                return Err(StoreError::SymbolNotFound(symbol.to_string()));
            }

            diesel::delete(stock_observations::table)
                .filter(stock_observations::symbol.eq(symbol.as_str()))
                .execute(conn)
                .map_err(StoreError::DeleteFailed)
        })
        .map_err(StoreError::into_delete_failure)
    }
}

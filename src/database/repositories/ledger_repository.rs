use crate::database::connection::PgPooledConnection;
use crate::database::errors::StoreError;
use crate::database::models::{NewObservation, StockObservation, Symbol};
use crate::database::schema::{stock_observations, stocks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Ledger repository trait - append-only price history per symbol
///
/// Only catalogued symbols have a ledger; both operations report
/// `SymbolNotFound` for anything else instead of an empty result.
pub trait LedgerRepository: Send + Sync {
    /// Append one observation; no deduplication and no ordering check
    fn append(
        &self,
        symbol: &Symbol,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<StockObservation, StoreError>;

    /// Observations at or after `since`, most recent first
    fn find_since(
        &self,
        symbol: &Symbol,
        since: DateTime<Utc>,
    ) -> Result<Vec<StockObservation>, StoreError>;
}

/// Concrete implementation of LedgerRepository
pub struct LedgerRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, StoreError> + Send + Sync>,
}

impl LedgerRepositoryImpl {
    /// Create new ledger repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, StoreError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl LedgerRepository for LedgerRepositoryImpl {
    fn append(
        &self,
        symbol: &Symbol,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<StockObservation, StoreError> {
        let mut conn = (self.get_conn)()?;

        // The key-share lock keeps a concurrent deletion from removing the
        // catalog row between the check and the insert.
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            stocks::table
                .filter(stocks::symbol.eq(symbol.as_str()))
                .select(stocks::id)
                .for_key_share()
                .first::<i64>(conn)?;

            diesel::insert_into(stock_observations::table)
                .values(&NewObservation::new(symbol, price, observed_at))
                .returning(StockObservation::as_returning())
                .get_result(conn)
        })
        .map_err(|e| StoreError::from_append(symbol.as_str(), e))
    }

    fn find_since(
        &self,
        symbol: &Symbol,
        since: DateTime<Utc>,
    ) -> Result<Vec<StockObservation>, StoreError> {
        let mut conn = (self.get_conn)()?;

        // Existence check and window read see the same snapshot
        conn.build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                stocks::table
                    .filter(stocks::symbol.eq(symbol.as_str()))
                    .select(stocks::id)
                    .first::<i64>(conn)?;

                stock_observations::table
                    .filter(stock_observations::symbol.eq(symbol.as_str()))
                    .filter(stock_observations::observed_at.ge(since))
                    .order((
                        stock_observations::observed_at.desc(),
                        stock_observations::id.desc(),
                    ))
                    .select(StockObservation::as_select())
                    .load(conn)
            })
            .map_err(|e| StoreError::from_read(symbol.as_str(), e))
    }
}

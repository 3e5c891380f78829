use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use super::errors::StoreError;
use super::models::{CatalogEntry, Stock, StockObservation, Symbol};
use super::repositories::{CatalogRepository, LedgerRepository};
use crate::utils::validation;

/// Outcome of a successful symbol deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolDeletion {
    pub symbol: Symbol,

    /// Ledger rows removed together with the catalog entry
    pub observations_removed: usize,
}

/// Read/write/delete operations over the catalog and history ledger
///
/// Accepts raw caller input, canonicalizes symbols and validates prices before
/// any storage access, then delegates to the repositories. Holds no cached
/// state: every call round-trips to storage, so a store can be shared freely
/// between threads.
#[derive(Clone)]
pub struct StockStore {
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl StockStore {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { catalog, ledger }
    }

    /// All catalogued symbols
    pub fn list_symbols(&self) -> Result<Vec<String>, StoreError> {
        self.catalog.list_symbols()
    }

    /// Register a new symbol with its starting price
    pub fn insert_initial_price(
        &self,
        symbol: &str,
        price: Decimal,
    ) -> Result<CatalogEntry, StoreError> {
        let symbol = Symbol::parse(symbol)?;
        check_price(price)?;

        let entry = self.catalog.insert(&symbol, price).map_err(|e| {
            tracing::warn!("Failed to catalog {}: {}", symbol, e);
            e
        })?;

        tracing::info!("Catalogued {} at {}", entry.symbol, entry.price);
        Ok(entry)
    }

    /// Overwrite the catalog price of an existing symbol
    pub fn update_price(&self, symbol: &str, price: Decimal) -> Result<CatalogEntry, StoreError> {
        let symbol = Symbol::parse(symbol)?;
        check_price(price)?;

        let entry = self.catalog.update_price(&symbol, price)?;

        tracing::info!("Updated {} price to {}", entry.symbol, entry.price);
        Ok(entry)
    }

    /// Full catalog row of a symbol
    pub fn find_entry(&self, symbol: &str) -> Result<CatalogEntry, StoreError> {
        let symbol = Symbol::parse(symbol)?;

        self.catalog
            .find_by_symbol(&symbol)?
            .ok_or_else(|| StoreError::SymbolNotFound(symbol.to_string()))
    }

    /// Latest catalog price of `stock`, refreshing the snapshot's id, price
    /// and last update as a side effect
    ///
    /// The snapshot is left untouched when the symbol is not catalogued.
    pub fn current_price(&self, stock: &mut Stock) -> Result<Decimal, StoreError> {
        let entry = self.find_entry(&stock.symbol)?;

        tracing::debug!("Read {} at {}", entry.symbol, entry.price);
        stock.refresh_from(&entry);
        Ok(entry.price)
    }

    /// Observations from the last `window_days` days, most recent first
    pub fn history(
        &self,
        symbol: &str,
        window_days: u32,
    ) -> Result<Vec<StockObservation>, StoreError> {
        self.history_as_of(symbol, window_days, Utc::now())
    }

    /// Observations with `observed_at >= as_of - window_days`, most recent first
    ///
    /// A zero-day window is always empty, but the symbol must still exist.
    pub fn history_as_of(
        &self,
        symbol: &str,
        window_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockObservation>, StoreError> {
        let symbol = Symbol::parse(symbol)?;

        if window_days == 0 {
            return match self.catalog.find_by_symbol(&symbol)? {
                Some(_) => Ok(Vec::new()),
                None => Err(StoreError::SymbolNotFound(symbol.to_string())),
            };
        }

        let observations = self
            .ledger
            .find_since(&symbol, window_start(as_of, window_days))?;

        tracing::debug!(
            "Loaded {} observations of {} over {} days",
            observations.len(),
            symbol,
            window_days
        );
        Ok(observations)
    }

    /// Append one observation to the symbol's ledger, stamped now unless given
    pub fn append_observation(
        &self,
        symbol: &str,
        price: Decimal,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<StockObservation, StoreError> {
        let symbol = Symbol::parse(symbol)?;
        check_price(price)?;

        let observation = self
            .ledger
            .append(&symbol, price, observed_at.unwrap_or_else(Utc::now))?;

        tracing::debug!(
            "Recorded {} at {} ({})",
            observation.symbol,
            observation.price,
            observation.observed_at
        );
        Ok(observation)
    }

    /// Remove a symbol's catalog entry and its whole ledger as one unit
    ///
    /// Either both are gone afterwards or neither changed.
    pub fn delete_symbol(&self, symbol: &str) -> Result<SymbolDeletion, StoreError> {
        let symbol = Symbol::parse(symbol)?;

        match self.catalog.delete_with_history(&symbol) {
            Ok(observations_removed) => {
                tracing::info!(
                    "Deleted {} and {} observations",
                    symbol,
                    observations_removed
                );
                Ok(SymbolDeletion {
                    symbol,
                    observations_removed,
                })
            }
            Err(e) => {
                if !e.is_not_found() {
                    tracing::error!("Deletion of {} rolled back: {}", symbol, e);
                }
                Err(e)
            }
        }
    }
}

fn check_price(price: Decimal) -> Result<(), StoreError> {
    if validation::is_valid_price(price) {
        Ok(())
    } else {
        Err(StoreError::InvalidPrice(format!("{} is not positive", price)))
    }
}

/// Earliest `timestamptz` PostgreSQL accepts (Julian day 0, 4714-11-24 BC), in
/// microseconds since the Unix epoch
const EARLIEST_STORABLE_MICROS: i64 = -210_866_803_200_000_000;

/// Earliest instant the ledger can hold; no stored observation predates it
fn earliest_storable() -> DateTime<Utc> {
    DateTime::from_timestamp_micros(EARLIEST_STORABLE_MICROS).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Inclusive lower bound of a day window, clamped to the earliest storable time
fn window_start(as_of: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    let floor = earliest_storable();
    Duration::try_days(i64::from(window_days))
        .and_then(|window| as_of.checked_sub_signed(window))
        .map_or(floor, |start| start.max(floor))
}

// Test helpers: an in-memory repository double, plus access to a real
// PostgreSQL instance. `pool()` returns None when DATABASE_URL is not set so
// database-backed tests pass as no-ops.

use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use super::connection::{establish_connection_pool, DatabasePool};
use super::errors::StoreError;
use super::models::{CatalogEntry, StockObservation, Symbol};
use super::repositories::{
    CatalogRepository, CatalogRepositoryImpl, LedgerRepository, LedgerRepositoryImpl,
};
use super::stock_store::StockStore;

static POOL: OnceLock<Option<DatabasePool>> = OnceLock::new();
static SYMBOL_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn pool() -> Option<DatabasePool> {
    POOL.get_or_init(|| {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = establish_connection_pool(&url, 8, Duration::from_secs(10))
            .expect("DATABASE_URL is set but the database is unreachable");
        pool.run_migrations().expect("migrations failed");
        Some(pool)
    })
    .clone()
}

pub fn catalog_repository(pool: &DatabasePool) -> Arc<dyn CatalogRepository> {
    let pool = pool.clone();
    Arc::new(CatalogRepositoryImpl::new(move || pool.get_conn()))
}

pub fn ledger_repository(pool: &DatabasePool) -> Arc<dyn LedgerRepository> {
    let pool = pool.clone();
    Arc::new(LedgerRepositoryImpl::new(move || pool.get_conn()))
}

pub fn stock_store(pool: &DatabasePool) -> StockStore {
    StockStore::new(catalog_repository(pool), ledger_repository(pool))
}

/// A symbol no other test uses, with any leftovers from earlier runs removed
pub fn fresh_symbol(pool: &DatabasePool, prefix: &str) -> Symbol {
    let n = SYMBOL_COUNTER.fetch_add(1, Ordering::Relaxed);
    let raw = format!("{}{:04X}{:03X}", prefix, std::process::id() & 0xFFFF, n & 0xFFF);
    let symbol = Symbol::parse(&raw).expect("generated symbol is valid");

    let _ = catalog_repository(pool).delete_with_history(&symbol);
    symbol
}

/// Runs a SQL batch when dropped, so fixtures are removed even if a test panics
pub struct CleanupOnDrop {
    pool: DatabasePool,
    sql: String,
}

impl CleanupOnDrop {
    pub fn new(pool: &DatabasePool, sql: impl Into<String>) -> Self {
        Self {
            pool: pool.clone(),
            sql: sql.into(),
        }
    }
}

impl Drop for CleanupOnDrop {
    fn drop(&mut self) {
        let result = self
            .pool
            .get_conn()
            .map_err(|e| e.to_string())
            .and_then(|mut conn| conn.batch_execute(&self.sql).map_err(|e| e.to_string()));
        if let Err(e) = result {
            eprintln!("test cleanup failed: {}", e);
        }
    }
}

/// Repository double holding catalog and ledger in memory
///
/// Implements both repository traits so one instance backs a whole `StockStore`.
/// Locks are always taken catalog first, then ledger.
#[derive(Default)]
pub struct InMemoryBackend {
    catalog: Mutex<BTreeMap<String, CatalogEntry>>,
    ledger: Mutex<Vec<StockObservation>>,
    next_id: AtomicI64,
    /// Number of repository calls that reached "storage"
    pub calls: AtomicUsize,
    /// Lower bound of the most recent window query
    pub last_since: Mutex<Option<DateTime<Utc>>>,
}

impl InMemoryBackend {
    fn touch(&self) -> i64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub fn in_memory_store() -> (StockStore, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::default());
    let store = StockStore::new(backend.clone(), backend.clone());
    (store, backend)
}

impl CatalogRepository for InMemoryBackend {
    fn list_symbols(&self) -> Result<Vec<String>, StoreError> {
        self.touch();
        Ok(self.catalog.lock().unwrap().keys().cloned().collect())
    }

    fn find_by_symbol(&self, symbol: &Symbol) -> Result<Option<CatalogEntry>, StoreError> {
        self.touch();
        Ok(self.catalog.lock().unwrap().get(symbol.as_str()).cloned())
    }

    fn insert(&self, symbol: &Symbol, price: Decimal) -> Result<CatalogEntry, StoreError> {
        let id = self.touch();
        let mut catalog = self.catalog.lock().unwrap();
        if catalog.contains_key(symbol.as_str()) {
            return Err(StoreError::DuplicateSymbol(symbol.to_string()));
        }
        let entry = CatalogEntry {
            id,
            symbol: symbol.to_string(),
            price,
            last_update: Utc::now(),
        };
        catalog.insert(symbol.to_string(), entry.clone());
        Ok(entry)
    }

    fn update_price(&self, symbol: &Symbol, price: Decimal) -> Result<CatalogEntry, StoreError> {
        self.touch();
        let mut catalog = self.catalog.lock().unwrap();
        let entry = catalog
            .get_mut(symbol.as_str())
            .ok_or_else(|| StoreError::SymbolNotFound(symbol.to_string()))?;
        entry.price = price;
        entry.last_update = Utc::now();
        Ok(entry.clone())
    }

    fn delete_with_history(&self, symbol: &Symbol) -> Result<usize, StoreError> {
        self.touch();
        let mut catalog = self.catalog.lock().unwrap();
        let mut ledger = self.ledger.lock().unwrap();
        if catalog.remove(symbol.as_str()).is_none() {
            return Err(StoreError::SymbolNotFound(symbol.to_string()));
        }
        let before = ledger.len();
        ledger.retain(|o| o.symbol != symbol.as_str());
        Ok(before - ledger.len())
    }
}

impl LedgerRepository for InMemoryBackend {
    fn append(
        &self,
        symbol: &Symbol,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<StockObservation, StoreError> {
        let id = self.touch();
        let catalog = self.catalog.lock().unwrap();
        if !catalog.contains_key(symbol.as_str()) {
            return Err(StoreError::SymbolNotFound(symbol.to_string()));
        }
        let observation = StockObservation {
            id,
            symbol: symbol.to_string(),
            price,
            observed_at,
        };
        self.ledger.lock().unwrap().push(observation.clone());
        Ok(observation)
    }

    fn find_since(
        &self,
        symbol: &Symbol,
        since: DateTime<Utc>,
    ) -> Result<Vec<StockObservation>, StoreError> {
        self.touch();
        *self.last_since.lock().unwrap() = Some(since);
        let catalog = self.catalog.lock().unwrap();
        if !catalog.contains_key(symbol.as_str()) {
            return Err(StoreError::SymbolNotFound(symbol.to_string()));
        }
        let mut rows: Vec<StockObservation> = self
            .ledger
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.symbol == symbol.as_str() && o.observed_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.observed_at, b.id).cmp(&(a.observed_at, a.id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cleanup_runs_when_test_body_panics() {
        let Some(pool) = pool() else {
            return;
        };
        let catalog = catalog_repository(&pool);
        let symbol = fresh_symbol(&pool, "GRD");
        catalog.insert(&symbol, dec!(5)).unwrap();

        let sql = format!("DELETE FROM stocks WHERE symbol = '{}';", symbol);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _cleanup = CleanupOnDrop::new(&pool, sql);
            panic!("assertion failed inside fixture");
        }));

        assert!(outcome.is_err());
        assert!(catalog.find_by_symbol(&symbol).unwrap().is_none());
    }
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// Catalog entry - the latest known price of one symbol
///
/// Exactly one row exists per canonical symbol. `price` and `last_update` are
/// overwritten by price updates; `id` and `symbol` never change.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::stocks)]
#[diesel(primary_key(id))]
pub struct CatalogEntry {
    /// Auto-incrementing ID assigned by storage
    pub id: i64,

    /// Canonical (uppercase) symbol
    pub symbol: String,

    /// Latest known price
    pub price: Decimal,

    /// When the price was last written
    pub last_update: DateTime<Utc>,
}

/// New catalog row for insertion; `id` and `last_update` come from column defaults
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::stocks)]
pub struct NewCatalogEntry<'a> {
    pub symbol: &'a str,
    pub price: Decimal,
}

impl<'a> NewCatalogEntry<'a> {
    pub fn new(symbol: &'a Symbol, price: Decimal) -> Self {
        Self {
            symbol: symbol.as_str(),
            price,
        }
    }
}

/// Disconnected, in-memory snapshot of a stock
///
/// Changing a `Stock` never touches storage. Reading the current price through
/// the store refreshes `id`, `price` and `last_update` from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,

    /// Catalog ID, known once the snapshot has been refreshed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub price: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl Stock {
    /// Create a snapshot identified only by its symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            id: None,
            price: Decimal::ZERO,
            last_update: None,
        }
    }

    /// Set price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Overwrite the snapshot with a catalog row
    pub fn refresh_from(&mut self, entry: &CatalogEntry) {
        self.id = Some(entry.id);
        self.symbol = entry.symbol.clone();
        self.price = entry.price;
        self.last_update = Some(entry.last_update);
    }
}

impl From<CatalogEntry> for Stock {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            symbol: entry.symbol,
            id: Some(entry.id),
            price: entry.price,
            last_update: Some(entry.last_update),
        }
    }
}

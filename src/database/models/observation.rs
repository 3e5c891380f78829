use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// One price observation in a symbol's history ledger
///
/// Immutable once written; removed only when the whole symbol is deleted.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::stock_observations)]
#[diesel(primary_key(id))]
pub struct StockObservation {
    /// Auto-incrementing ID
    pub id: i64,

    /// Canonical symbol the observation belongs to
    pub symbol: String,

    pub price: Decimal,

    /// When the price was observed (may be older than rows already stored)
    pub observed_at: DateTime<Utc>,
}

/// New observation for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::stock_observations)]
pub struct NewObservation<'a> {
    pub symbol: &'a str,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl<'a> NewObservation<'a> {
    pub fn new(symbol: &'a Symbol, price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.as_str(),
            price,
            observed_at,
        }
    }
}

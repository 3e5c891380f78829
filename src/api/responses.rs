use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::StockObservation;

/// Request to catalog a new symbol
#[derive(Debug, Deserialize)]
pub struct CreateStockRequest {
    pub symbol: String,
    pub price: Decimal,
}

/// Request to overwrite a symbol's catalog price
#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub price: Decimal,
}

/// Request to append one observation to a symbol's history
#[derive(Debug, Deserialize)]
pub struct AppendObservationRequest {
    pub price: Decimal,
    /// Observation time (RFC3339); defaults to now
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQueryParams {
    /// Window size in days
    #[serde(default = "default_history_days")]
    pub days: u32,
}

fn default_history_days() -> u32 {
    30
}

/// Catalogued symbols
#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolListResponse {
    pub symbols: Vec<String>,
    pub count: usize,
}

/// Observations of one symbol, most recent first
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub days: u32,
    pub observations: Vec<StockObservation>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

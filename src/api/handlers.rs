use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::responses::*;
use crate::database::models::{CatalogEntry, Stock, StockObservation, Symbol};
use crate::database::{StockStore, StoreError, SymbolDeletion};

/// Failure of an HTTP handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking storage task panicked or was cancelled
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(e) => match e {
                StoreError::InvalidSymbol(_) | StoreError::InvalidPrice(_) => {
                    StatusCode::BAD_REQUEST
                }
                StoreError::SymbolNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::DuplicateSymbol(_) => StatusCode::CONFLICT,
                StoreError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::QueryFailed(_)
                | StoreError::ExecFailed(_)
                | StoreError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Store(e) => match e {
                StoreError::InvalidSymbol(_) => "invalid_symbol",
                StoreError::InvalidPrice(_) => "invalid_price",
                StoreError::SymbolNotFound(_) => "symbol_not_found",
                StoreError::DuplicateSymbol(_) => "duplicate_symbol",
                StoreError::StorageUnavailable(_) => "storage_unavailable",
                StoreError::QueryFailed(_) => "query_failed",
                StoreError::ExecFailed(_) => "exec_failed",
                StoreError::DeleteFailed(_) => "delete_failed",
            },
            ApiError::Task(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        // Storage internals stay in the log
        let message = match &self {
            ApiError::Store(e) if e.is_storage_error() => status
                .canonical_reason()
                .unwrap_or("Storage error")
                .to_string(),
            ApiError::Task(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Run a store operation on the blocking thread pool
async fn run_blocking<T, F>(store: StockStore, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&StockStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || op(&store)).await??)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// List all catalogued symbols
pub async fn list_stocks(
    State(store): State<StockStore>,
) -> Result<Json<SymbolListResponse>, ApiError> {
    let symbols = run_blocking(store, |store| store.list_symbols()).await?;

    Ok(Json(SymbolListResponse {
        count: symbols.len(),
        symbols,
    }))
}

/// Catalog a new symbol with its starting price
pub async fn create_stock(
    State(store): State<StockStore>,
    Json(request): Json<CreateStockRequest>,
) -> Result<(StatusCode, Json<CatalogEntry>), ApiError> {
    let entry = run_blocking(store, move |store| {
        store.insert_initial_price(&request.symbol, request.price)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Current price snapshot of a symbol
pub async fn get_stock(
    State(store): State<StockStore>,
    Path(symbol): Path<String>,
) -> Result<Json<Stock>, ApiError> {
    let stock = run_blocking(store, move |store| {
        let mut stock = Stock::new(symbol);
        store.current_price(&mut stock)?;
        Ok(stock)
    })
    .await?;

    Ok(Json(stock))
}

/// Overwrite a symbol's catalog price
pub async fn update_price(
    State(store): State<StockStore>,
    Path(symbol): Path<String>,
    Json(request): Json<UpdatePriceRequest>,
) -> Result<Json<CatalogEntry>, ApiError> {
    run_blocking(store, move |store| store.update_price(&symbol, request.price))
        .await
        .map(Json)
}

/// Delete a symbol together with its history
pub async fn delete_stock(
    State(store): State<StockStore>,
    Path(symbol): Path<String>,
) -> Result<Json<SymbolDeletion>, ApiError> {
    run_blocking(store, move |store| store.delete_symbol(&symbol))
        .await
        .map(Json)
}

/// Price history of a symbol over the last `days` days
pub async fn get_history(
    State(store): State<StockStore>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let days = params.days;
    let (symbol, observations) = run_blocking(store, move |store| {
        let symbol = Symbol::parse(&symbol)?;
        let observations = store.history(symbol.as_str(), days)?;
        Ok((symbol.to_string(), observations))
    })
    .await?;

    Ok(Json(HistoryResponse {
        symbol,
        days,
        count: observations.len(),
        observations,
    }))
}

/// Append one observation to a symbol's history
pub async fn append_observation(
    State(store): State<StockStore>,
    Path(symbol): Path<String>,
    Json(request): Json<AppendObservationRequest>,
) -> Result<(StatusCode, Json<StockObservation>), ApiError> {
    let observation = run_blocking(store, move |store| {
        store.append_observation(&symbol, request.price, request.observed_at)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(observation)))
}

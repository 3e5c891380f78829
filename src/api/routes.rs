use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::*;
use crate::database::StockStore;

/// Create the API router over a price store
pub fn create_router(store: StockStore) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Catalog endpoints
        .route("/api/v1/stocks", get(list_stocks).post(create_stock))
        .route("/api/v1/stocks/:symbol", get(get_stock).delete(delete_stock))
        .route("/api/v1/stocks/:symbol/price", put(update_price))
        // History endpoints
        .route(
            "/api/v1/stocks/:symbol/history",
            get(get_history).post(append_observation),
        )
        .with_state(store)
}

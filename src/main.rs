use std::process::ExitCode;
use std::sync::Arc;
use stock_price_store::database::repositories::{
    CatalogRepository, CatalogRepositoryImpl, LedgerRepository, LedgerRepositoryImpl,
};
use stock_price_store::database::{establish_connection_pool, DatabaseError, DatabasePool};
use stock_price_store::{create_router, ConfigError, StockStore, StoreConfig};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reasons the server stops before or while serving
#[derive(Debug, Error)]
enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Database setup failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Server I/O error on {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_price_store=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = StoreConfig::from_env()?;
    serve(&config).await
}

async fn serve(config: &StoreConfig) -> Result<(), StartupError> {
    let store = initialize_store(config)?;
    let app = create_router(store);

    let io_error = |source: std::io::Error| StartupError::Io {
        addr: config.server_addr.clone(),
        source,
    };

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .map_err(io_error)?;

    tracing::info!("🚀 Stock price store running on http://{}", config.server_addr);
    tracing::info!("📊 Health check: http://{}/health", config.server_addr);
    tracing::info!("📈 Stocks: http://{}/api/v1/stocks", config.server_addr);

    axum::serve(listener, app).await.map_err(io_error)
}

/// Connect to PostgreSQL, apply migrations and wire the repositories
fn initialize_store(config: &StoreConfig) -> Result<StockStore, DatabaseError> {
    tracing::info!("🗄️  Initializing PostgreSQL connection pool...");

    let pool = establish_connection_pool(
        &config.database_url,
        config.pool_max_size,
        config.connection_timeout,
    )?;
    tracing::info!("✅ Database connection established successfully");

    if config.run_migrations {
        match pool.run_migrations()? {
            0 => tracing::info!("✅ Schema is up to date"),
            n => tracing::info!("✅ Applied {} migration(s)", n),
        }
    }

    Ok(build_store(pool))
}

fn build_store(pool: DatabasePool) -> StockStore {
    let pool_clone = pool.clone();
    let catalog = Arc::new(CatalogRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn CatalogRepository>;

    let ledger =
        Arc::new(LedgerRepositoryImpl::new(move || pool.get_conn())) as Arc<dyn LedgerRepository>;

    tracing::info!("✅ Catalog and history repositories initialized");

    StockStore::new(catalog, ledger)
}

//! CarLedger Server - HTTP façade for CarLedger Core
//!
//! Exposes the car contract as a small REST API. Every request runs as its
//! own transaction against a shared in-memory ledger:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  LedgerServer                     │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │    carledger-core::AssetContract           │  │
//! │  │    InMemoryStore + EventLog                │  │
//! │  └────────────────────────────────────────────┘  │
//! │                       │                           │
//! │     ┌─────────────────┼──────────────────┐        │
//! │     ▼                 ▼                  ▼        │
//! │ /api/cars     /api/cars/:car_number  /api/events  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! All contract logic stays in `carledger-core`.

mod config;
pub mod error;
pub mod routes;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{ApiError, ApiResult};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use carledger_core::{
    AssetContract, EventLog, InMemoryStore, LedgerError, TransactionContext, TxInfo,
};

/// Shared application state
#[derive(Debug, Default)]
pub struct AppState {
    pub store: InMemoryStore,
    pub events: EventLog,
    pub contract: AssetContract,
}

impl AppState {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    /// Context for a fresh transaction
    pub fn transaction(&self) -> TransactionContext<'_> {
        let tx = TxInfo::generate();
        tracing::debug!(tx_id = tx.tx_id(), "transaction started");
        TransactionContext::new(&self.store, &self.events, tx)
    }
}

/// CarLedger HTTP Server
///
/// # Example
///
/// ```rust,ignore
/// use carledger_server::{LedgerServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let config = ServerConfig::builder().port(3000).seed_on_start(true).build();
///     let server = LedgerServer::new(config);
///     server.run().await.unwrap();
/// }
/// ```
pub struct LedgerServer {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl LedgerServer {
    /// Server over an empty ledger
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(InMemoryStore::new(), config)
    }

    /// Server over an existing store
    pub fn with_store(store: InMemoryStore, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(store)),
            config,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Write the sample cars
    pub fn seed(&self) -> Result<(), LedgerError> {
        self.state
            .contract
            .init_ledger(&self.state.transaction())
    }

    /// Build the Axum router with all routes
    pub fn router(&self) -> Router {
        routes::create_router(Arc::clone(&self.state), self.config.cors_enabled)
    }

    /// Get the socket address for the server
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.config.host, self.config.port)
    }

    /// Run the server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.config.seed_on_start {
            self.seed()?;
            tracing::info!("Ledger seeded with {} cars", self.state.store.len());
        }

        let app = self.router();
        let addr = self.addr();

        tracing::info!("CarLedger API listening on http://{}", addr);
        tracing::info!("Endpoints:");
        tracing::info!("  GET  /api/health");
        tracing::info!("  GET  /api/cars");
        tracing::info!("  POST /api/cars");
        tracing::info!("  GET  /api/cars/:car_number");
        tracing::info!("  PUT  /api/cars/:car_number");
        tracing::info!("  PUT  /api/cars/:car_number/owner");
        tracing::info!("  GET  /api/cars/:car_number/history");
        tracing::info!("  GET  /api/cars/owner/:owner");
        tracing::info!("  GET  /api/cars/make/:make");
        tracing::info!("  POST /api/init");
        tracing::info!("  GET  /api/events");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

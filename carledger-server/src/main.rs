//! CarLedger Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (0.0.0.0:3000, empty ledger)
//! carledger-server
//!
//! # Custom port, seeded with the sample cars
//! CARLEDGER_PORT=8080 CARLEDGER_SEED=true carledger-server
//!
//! # Local only, no CORS
//! CARLEDGER_HOST=127.0.0.1 CARLEDGER_CORS=false carledger-server
//! ```

use carledger_server::{LedgerServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carledger_server=info,carledger_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    tracing::info!("Starting CarLedger Server v{}", env!("CARGO_PKG_VERSION"));

    let server = LedgerServer::new(config);
    server.run().await?;

    Ok(())
}

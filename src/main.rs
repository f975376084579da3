use std::sync::Arc;

use point_service::{
    adapters::{
        database::memory::{MemoryBalanceStore, MemoryHistoryLog},
        http,
    },
    commands::PointLedger,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ledger = PointLedger::new(
        Arc::new(MemoryBalanceStore::default()),
        Arc::new(MemoryHistoryLog::default()),
    );
    let app = http::router(ledger);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "point service listening");
    axum::serve(listener, app).await?;

    Ok(())
}

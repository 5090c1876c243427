/// Axum HTTP server setup and routing

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chain::MockChain;
use crate::handlers::*;

pub fn create_router(chain: Arc<MockChain>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Address endpoints
        .route("/api/address/addressesTxs/:csv", get(get_addresses_txs))
        .route("/api/address/:address/count/:count/raw", get(get_address_raw))
        .route("/api/address/:address/totals", get(get_address_totals))
        // Transaction endpoints
        .route("/api/broadcast", get(broadcast_transaction))
        .with_state(chain)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(chain: Arc<MockChain>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(chain);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Indexer mock listening on http://{}/api", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve on an ephemeral local port in the background.
/// Returns the bound address; the API lives under `http://{addr}/api`.
pub async fn spawn_server(
    chain: Arc<MockChain>,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(chain);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Indexer mock stopped: {}", e);
        }
    });

    Ok((addr, handle))
}

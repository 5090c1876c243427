/// Axum HTTP handlers for the indexer API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::chain::MockChain;
use crate::types::*;

/// Shared application state
pub type AppState = Arc<MockChain>;

/// Errors are reported the way the real indexer does: a JSON `{error}` body
pub enum ApiError {
    Rejected(String),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Rejected(msg) => (StatusCode::OK, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Rejected(err.to_string())
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /address/{addr}/count/{n}/raw
/// Returns the newest `n` transactions of an address
pub async fn get_address_raw(
    State(chain): State<AppState>,
    Path((address, count)): Path<(String, usize)>,
) -> Json<Vec<RawTx>> {
    Json(chain.history(&address, count).await)
}

/// GET /address/addressesTxs/{csvAddrs}
/// Returns a map of address -> transactions for every address with history
pub async fn get_addresses_txs(
    State(chain): State<AppState>,
    Path(csv): Path<String>,
) -> Result<Json<HashMap<String, Vec<RawTx>>>, ApiError> {
    let addresses: Vec<&str> = csv.split(',').filter(|a| !a.is_empty()).collect();
    log::debug!("History requested for {} address(es)", addresses.len());
    let histories = chain.histories(&addresses).await?;
    Ok(Json(histories))
}

/// GET /address/{addr}/totals
pub async fn get_address_totals(
    State(chain): State<AppState>,
    Path(address): Path<String>,
) -> Json<TotalsResponse> {
    let dcr_unspent = chain.unspent(&address).await;
    Json(TotalsResponse {
        address,
        dcr_unspent,
    })
}

#[derive(Debug, Deserialize)]
pub struct BroadcastQuery {
    pub hex: Option<String>,
}

/// GET /broadcast?hex={hex}
/// Returns `{data: txid}` or `{error}`
pub async fn broadcast_transaction(
    State(chain): State<AppState>,
    Query(query): Query<BroadcastQuery>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let hex = query
        .hex
        .ok_or_else(|| ApiError::BadRequest("Missing hex parameter".to_string()))?;
    let txid = chain.broadcast(&hex).await?;
    Ok(Json(BroadcastResponse { data: txid }))
}

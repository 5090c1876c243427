//! Indexer/broadcast collaborator
//!
//! - `Indexer` trait: the four HTTP operations the core depends on
//! - `HttpIndexer`: reqwest implementation against a dcrdata-style API
//! - Raw transaction record types

pub mod types;

pub use types::{AddressTotals, BroadcastResponse, ScriptPubKey, TxInput, TxOutput, TxRecord};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;

use crate::error::WalletError;

/// Transaction-history and broadcast service.
///
/// Every method either returns the decoded payload or an error; an `{error}`
/// body from the service is an error.
pub trait Indexer: Send + Sync {
    /// `GET /address/{addr}/count/{n}/raw`
    fn address_txs_raw(
        &self,
        address: &str,
        count: u32,
    ) -> impl Future<Output = Result<Vec<TxRecord>, WalletError>> + Send;

    /// `GET /address/addressesTxs/{csvAddrs}`
    fn addresses_txs(
        &self,
        addresses: &[String],
    ) -> impl Future<Output = Result<HashMap<String, Vec<TxRecord>>, WalletError>> + Send;

    /// `GET /address/{addr}/totals`
    fn address_totals(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<AddressTotals, WalletError>> + Send;

    /// `GET /broadcast?hex={hex}`, returning the txid
    fn broadcast(&self, tx_hex: &str) -> impl Future<Output = Result<String, WalletError>> + Send;
}

#[derive(Clone)]
pub struct HttpIndexer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIndexer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &crate::config::WalletConfig) -> Self {
        Self::new(config.indexer_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);
        self.client.get(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, WalletError> {
        // Transport failures convert through `From<reqwest::Error>` into `Network`
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::Indexer(format!("Error status: {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WalletError::Indexer(e.to_string()))?;

        if let Some(error) = body.as_object().and_then(|obj| obj.get("error")) {
            if !error.is_null() && *error != serde_json::Value::Bool(false) {
                return Err(WalletError::Indexer(error.to_string()));
            }
        }

        serde_json::from_value(body).map_err(|e| WalletError::Indexer(e.to_string()))
    }
}

impl Indexer for HttpIndexer {
    async fn address_txs_raw(&self, address: &str, count: u32) -> Result<Vec<TxRecord>, WalletError> {
        self.fetch(self.get(&format!("/address/{}/count/{}/raw", address, count)))
            .await
    }

    async fn addresses_txs(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, Vec<TxRecord>>, WalletError> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }
        self.fetch(self.get(&format!("/address/addressesTxs/{}", addresses.join(","))))
            .await
    }

    async fn address_totals(&self, address: &str) -> Result<AddressTotals, WalletError> {
        self.fetch(self.get(&format!("/address/{}/totals", address)))
            .await
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<String, WalletError> {
        let response: BroadcastResponse = self
            .fetch(self.get("/broadcast").query(&[("hex", tx_hex)]))
            .await?;
        Ok(response.data)
    }
}

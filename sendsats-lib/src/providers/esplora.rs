//! Esplora block explorer API backend.
//!
//! Connects to Esplora-compatible APIs (Blockstream, mempool.space) and
//! covers every capability of the pipeline: UTXO listing, confirmed balance,
//! fee estimation by confirmation target, and raw-transaction broadcast.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{BalanceProvider, BroadcastProvider, FeeProvider, UtxoProvider};
use crate::errors::SendsatsError;
use crate::fees::FeeTier;
use crate::types::{Network, UnspentOutput};
use crate::Result;

fn default_timeout() -> u64 {
    30
}

/// Configuration for an Esplora-compatible HTTP backend.
#[derive(Clone, Debug, serde::Serialize, Deserialize)]
pub struct EsploraConfig {
    /// API base URL (e.g. `https://blockstream.info/api`).
    pub api_url: String,

    /// Network the explorer serves.
    #[serde(default)]
    pub network: Network,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl EsploraConfig {
    /// Create a configuration for a custom endpoint.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            network: Network::default(),
            timeout_secs: default_timeout(),
        }
    }

    /// Blockstream.info endpoint for `network`.
    pub fn blockstream(network: Network) -> Self {
        let api_url = match network {
            Network::Mainnet => "https://blockstream.info/api",
            Network::Testnet => "https://blockstream.info/testnet/api",
        };
        Self::new(api_url).with_network(network)
    }

    /// mempool.space endpoint for `network`.
    pub fn mempool(network: Network) -> Self {
        let api_url = match network {
            Network::Mainnet => "https://mempool.space/api",
            Network::Testnet => "https://mempool.space/testnet/api",
        };
        Self::new(api_url).with_network(network)
    }

    /// Set the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Esplora API client implementing all four provider capabilities.
pub struct EsploraClient {
    config: EsploraConfig,
    client: reqwest::Client,
}

impl EsploraClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EsploraConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SendsatsError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Get the configuration.
    pub fn config(&self) -> &EsploraConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendsatsError::Network(format!(
                "esplora request {path:?} failed ({status}): {body}"
            )));
        }
        response.json::<T>().await.map_err(|e| {
            SendsatsError::ProviderResponse(format!("esplora response for {path:?}: {e}"))
        })
    }

    async fn post_text(&self, path: &str, body: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            SendsatsError::ProviderResponse(format!("esplora response for {path:?}: {e}"))
        })?;
        if !status.is_success() {
            return Err(SendsatsError::Network(format!(
                "esplora request {path:?} failed ({status}): {text}"
            )));
        }
        Ok(text)
    }

    async fn tip_height(&self) -> Result<u64> {
        self.get_json("blocks/tip/height").await
    }
}

/// Pick the rate for `target` blocks out of an Esplora fee-estimates map.
///
/// Exact match first; otherwise the closest available target, preferring the
/// faster one on ties.
fn rate_for_target(estimates: &HashMap<String, f64>, target: u32) -> Option<f64> {
    if let Some(&rate) = estimates.get(&target.to_string()) {
        return Some(rate);
    }

    let mut closest: Option<(u32, f64)> = None;
    for (key, &rate) in estimates {
        let Ok(blocks) = key.parse::<u32>() else {
            continue;
        };
        let diff = blocks.abs_diff(target);
        let better = match closest {
            None => true,
            Some((best_blocks, _)) => {
                let best_diff = best_blocks.abs_diff(target);
                diff < best_diff || (diff == best_diff && blocks < best_blocks)
            }
        };
        if better {
            closest = Some((blocks, rate));
        }
    }
    closest.map(|(_, rate)| rate)
}

fn confirmations_for(status: &UtxoStatus, tip: u64) -> u64 {
    match (status.confirmed, status.block_height) {
        (true, Some(height)) => tip.saturating_sub(height) + 1,
        _ => 0,
    }
}

#[async_trait]
impl FeeProvider for EsploraClient {
    async fn fee_rate(&self, tier: FeeTier) -> Result<f64> {
        let estimates: HashMap<String, f64> = self.get_json("fee-estimates").await?;
        rate_for_target(&estimates, tier.confirmation_target()).ok_or_else(|| {
            SendsatsError::ProviderResponse(format!(
                "fee-estimates carried no usable target for tier {tier}"
            ))
        })
    }
}

#[async_trait]
impl UtxoProvider for EsploraClient {
    async fn utxos(&self, address: &str) -> Result<Vec<UnspentOutput>> {
        let raw: Vec<EsploraUtxo> = self.get_json(&format!("address/{address}/utxo")).await?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        // Esplora reports block heights, not confirmation counts.
        let tip = self.tip_height().await?;
        Ok(raw
            .into_iter()
            .map(|utxo| UnspentOutput {
                confirmations: confirmations_for(&utxo.status, tip),
                txid: utxo.txid,
                vout: utxo.vout,
                amount_sats: utxo.value,
            })
            .collect())
    }
}

#[async_trait]
impl BalanceProvider for EsploraClient {
    async fn balance_sats(&self, address: &str) -> Result<u64> {
        let info: AddressInfo = self.get_json(&format!("address/{address}")).await?;
        Ok(info.chain_stats.funded_txo_sum.saturating_sub(info.chain_stats.spent_txo_sum))
    }
}

#[async_trait]
impl BroadcastProvider for EsploraClient {
    async fn broadcast(&self, tx_hex: &str) -> Result<String> {
        let txid = self.post_text("tx", tx_hex).await?;
        Ok(txid.trim().to_string())
    }
}

/// A UTXO as Esplora reports it.
#[derive(Clone, Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    value: u64,
    status: UtxoStatus,
}

/// Confirmation status of an output.
#[derive(Clone, Debug, Deserialize)]
struct UtxoStatus {
    confirmed: bool,
    #[serde(default)]
    block_height: Option<u64>,
}

/// Address information from the Esplora API.
#[derive(Clone, Debug, Deserialize)]
struct AddressInfo {
    chain_stats: AddressStats,
}

#[derive(Clone, Debug, Deserialize)]
struct AddressStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
}

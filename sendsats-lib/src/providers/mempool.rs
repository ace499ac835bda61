//! mempool.space recommended-fee backend.
//!
//! The `/v1/fees/recommended` endpoint returns named rates that map directly
//! onto [`FeeTier`], so tier lookups need no confirmation-target math.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{EsploraConfig, FeeProvider};
use crate::errors::SendsatsError;
use crate::fees::FeeTier;
use crate::Result;

/// Fee provider backed by the mempool.space recommended-fees endpoint.
pub struct MempoolFeeProvider {
    config: EsploraConfig,
    client: reqwest::Client,
}

impl MempoolFeeProvider {
    /// Create a new provider from an Esplora-style configuration.
    pub fn new(config: EsploraConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SendsatsError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn recommended(&self) -> Result<RecommendedFees> {
        let url = format!(
            "{}/v1/fees/recommended",
            self.config.api_url.trim_end_matches('/')
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendsatsError::Network(format!(
                "recommended-fees request failed ({status}): {body}"
            )));
        }
        response.json::<RecommendedFees>().await.map_err(|e| {
            SendsatsError::ProviderResponse(format!("recommended-fees response: {e}"))
        })
    }
}

#[async_trait]
impl FeeProvider for MempoolFeeProvider {
    async fn fee_rate(&self, tier: FeeTier) -> Result<f64> {
        let fees = self.recommended().await?;
        Ok(match tier {
            FeeTier::Fastest => fees.fastest_fee,
            FeeTier::HalfHour => fees.half_hour_fee,
            FeeTier::Hour => fees.hour_fee,
        })
    }
}

/// Response shape of `/v1/fees/recommended`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedFees {
    fastest_fee: f64,
    half_hour_fee: f64,
    hour_fee: f64,
    #[serde(default)]
    #[allow(dead_code)]
    economy_fee: f64,
    #[serde(default)]
    #[allow(dead_code)]
    minimum_fee: f64,
}

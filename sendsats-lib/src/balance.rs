//! Address balance lookup.

use crate::errors::SendsatsError;
use crate::providers::ProviderRegistry;
use crate::types::{Network, SATS_PER_BTC};
use crate::Result;

/// Fetch the confirmed balance of `address` in whole bitcoin.
///
/// `provider` picks a named balance backend; `None` uses the network's
/// default. The backend reports satoshis, which are divided by 10^8 here.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip(registry), fields(network = %network))
)]
pub async fn get_balance(
    registry: &ProviderRegistry,
    address: &str,
    network: Network,
    provider: Option<&str>,
) -> Result<f64> {
    if address.trim().is_empty() {
        return Err(SendsatsError::validation("address", "address is empty"));
    }
    let backend = registry.balance_provider(network, provider)?;
    let sats = backend.balance_sats(address).await?;
    Ok(sats as f64 / SATS_PER_BTC as f64)
}

//! Pluggable blockchain-data providers.
//!
//! Every piece of remote data the payment pipeline needs (fee rates, UTXO
//! lists, balances, broadcast) arrives through one of the capability traits
//! below, so any backend service can be swapped in. The built-in backends
//! speak the Esplora API (Blockstream, mempool.space); the
//! [`ProviderRegistry`] maps `(capability, network, name)` to instances and
//! keeps a rebindable default per slot.

use async_trait::async_trait;
use std::fmt;

use crate::fees::FeeTier;
use crate::types::UnspentOutput;
use crate::Result;

mod esplora;
mod mempool;
mod registry;

pub use esplora::{EsploraClient, EsploraConfig};
pub use mempool::MempoolFeeProvider;
pub use registry::ProviderRegistry;

/// The four kinds of remote data the pipeline consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Confirmed balance of an address.
    Balance,
    /// Fee rate for a processing-speed tier.
    Fees,
    /// Spendable outputs of an address.
    Utxo,
    /// Raw-transaction broadcast.
    PushTx,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Balance => "balance",
            Self::Fees => "fees",
            Self::Utxo => "utxo",
            Self::PushTx => "pushtx",
        };
        write!(f, "{name}")
    }
}

/// Source of fee rates for named speed tiers.
#[async_trait]
pub trait FeeProvider: Send + Sync {
    /// Current rate for `tier`, in satoshis per byte.
    async fn fee_rate(&self, tier: FeeTier) -> Result<f64>;
}

/// Source of spendable outputs for an address.
#[async_trait]
pub trait UtxoProvider: Send + Sync {
    /// All known unspent outputs of `address`, in the provider's order.
    async fn utxos(&self, address: &str) -> Result<Vec<UnspentOutput>>;
}

/// Source of confirmed address balances.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Confirmed balance of `address` in satoshis.
    async fn balance_sats(&self, address: &str) -> Result<u64>;
}

/// Sink for signed raw transactions.
#[async_trait]
pub trait BroadcastProvider: Send + Sync {
    /// Submit `tx_hex` to the network; the acknowledgment string is
    /// provider-defined and not interpreted by the core.
    async fn broadcast(&self, tx_hex: &str) -> Result<String>;
}

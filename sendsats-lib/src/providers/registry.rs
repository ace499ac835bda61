//! Provider registry: named backends per capability and network.
//!
//! The registry uses `RwLock` for thread-safe access and recovers poisoned
//! locks by taking the inner value, so lookups never panic. Registration is
//! intended to happen once at startup, before the registry is shared with
//! concurrent callers; after that it is read-mostly.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{BalanceProvider, BroadcastProvider, Capability, FeeProvider, UtxoProvider};
use crate::errors::SendsatsError;
use crate::providers::{EsploraClient, EsploraConfig, MempoolFeeProvider};
use crate::types::Network;
use crate::Result;

/// Named backends for a single capability, with one default slot per network.
struct CapabilityTable<T: ?Sized> {
    capability: Capability,
    entries: HashMap<(Network, String), Arc<T>>,
    defaults: HashMap<Network, String>,
}

impl<T: ?Sized> CapabilityTable<T> {
    fn new(capability: Capability) -> Self {
        Self {
            capability,
            entries: HashMap::new(),
            defaults: HashMap::new(),
        }
    }

    fn register(&mut self, network: Network, name: impl Into<String>, provider: Arc<T>) {
        let name = name.into();
        // First registration for a network becomes its default.
        self.defaults.entry(network).or_insert_with(|| name.clone());
        self.entries.insert((network, name), provider);
    }

    fn set_default(&mut self, network: Network, name: &str) -> Result<()> {
        if !self.entries.contains_key(&(network, name.to_string())) {
            return Err(SendsatsError::unknown_provider(
                self.capability,
                network,
                Some(name),
            ));
        }
        self.defaults.insert(network, name.to_string());
        Ok(())
    }

    fn get(&self, network: Network, name: Option<&str>) -> Result<Arc<T>> {
        let resolved = match name {
            Some(name) => name,
            None => self
                .defaults
                .get(&network)
                .map(String::as_str)
                .ok_or_else(|| {
                    SendsatsError::unknown_provider(self.capability, network, None)
                })?,
        };
        self.entries
            .get(&(network, resolved.to_string()))
            .cloned()
            .ok_or_else(|| SendsatsError::unknown_provider(self.capability, network, name))
    }
}

/// Registry mapping `(capability, network, name)` to provider instances.
///
/// Handed to the orchestrator explicitly rather than living in global state,
/// so tests can inject fakes without touching anything shared.
pub struct ProviderRegistry {
    fees: RwLock<CapabilityTable<dyn FeeProvider>>,
    utxos: RwLock<CapabilityTable<dyn UtxoProvider>>,
    balances: RwLock<CapabilityTable<dyn BalanceProvider>>,
    pushtx: RwLock<CapabilityTable<dyn BroadcastProvider>>,
}

impl ProviderRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            fees: RwLock::new(CapabilityTable::new(Capability::Fees)),
            utxos: RwLock::new(CapabilityTable::new(Capability::Utxo)),
            balances: RwLock::new(CapabilityTable::new(Capability::Balance)),
            pushtx: RwLock::new(CapabilityTable::new(Capability::PushTx)),
        }
    }

    /// Creates a registry wired to the built-in public backends.
    ///
    /// `"blockstream"` and `"mempool"` are registered for every capability on
    /// both networks. Defaults: fees come from mempool.space's recommended
    /// tiers (they carry the `fastest`/`halfHour`/`hour` names natively);
    /// everything else from Blockstream.
    pub fn with_defaults() -> Result<Self> {
        let registry = Self::new();

        for network in [Network::Mainnet, Network::Testnet] {
            let blockstream = Arc::new(EsploraClient::new(EsploraConfig::blockstream(network))?);
            let mempool = Arc::new(EsploraClient::new(EsploraConfig::mempool(network))?);
            let mempool_fees = Arc::new(MempoolFeeProvider::new(EsploraConfig::mempool(network))?);

            registry.register_utxo_provider(network, "blockstream", blockstream.clone());
            registry.register_utxo_provider(network, "mempool", mempool.clone());
            registry.register_balance_provider(network, "blockstream", blockstream.clone());
            registry.register_balance_provider(network, "mempool", mempool.clone());
            registry.register_broadcast_provider(network, "blockstream", blockstream.clone());
            registry.register_broadcast_provider(network, "mempool", mempool.clone());
            registry.register_fee_provider(network, "blockstream", blockstream);
            registry.register_fee_provider(network, "mempool", mempool_fees);
            registry.set_default_fee_provider(network, "mempool")?;
        }

        Ok(registry)
    }

    /// Registers a fee backend; the first backend per network becomes its default.
    pub fn register_fee_provider(
        &self,
        network: Network,
        name: impl Into<String>,
        provider: Arc<dyn FeeProvider>,
    ) {
        let mut table = self.fees.write().unwrap_or_else(|e| e.into_inner());
        table.register(network, name, provider);
    }

    /// Registers a UTXO backend.
    pub fn register_utxo_provider(
        &self,
        network: Network,
        name: impl Into<String>,
        provider: Arc<dyn UtxoProvider>,
    ) {
        let mut table = self.utxos.write().unwrap_or_else(|e| e.into_inner());
        table.register(network, name, provider);
    }

    /// Registers a balance backend.
    pub fn register_balance_provider(
        &self,
        network: Network,
        name: impl Into<String>,
        provider: Arc<dyn BalanceProvider>,
    ) {
        let mut table = self.balances.write().unwrap_or_else(|e| e.into_inner());
        table.register(network, name, provider);
    }

    /// Registers a broadcast backend.
    pub fn register_broadcast_provider(
        &self,
        network: Network,
        name: impl Into<String>,
        provider: Arc<dyn BroadcastProvider>,
    ) {
        let mut table = self.pushtx.write().unwrap_or_else(|e| e.into_inner());
        table.register(network, name, provider);
    }

    /// Rebinds the default fee backend; the name must already be registered.
    pub fn set_default_fee_provider(&self, network: Network, name: &str) -> Result<()> {
        let mut table = self.fees.write().unwrap_or_else(|e| e.into_inner());
        table.set_default(network, name)
    }

    /// Rebinds the default UTXO backend.
    pub fn set_default_utxo_provider(&self, network: Network, name: &str) -> Result<()> {
        let mut table = self.utxos.write().unwrap_or_else(|e| e.into_inner());
        table.set_default(network, name)
    }

    /// Rebinds the default balance backend.
    pub fn set_default_balance_provider(&self, network: Network, name: &str) -> Result<()> {
        let mut table = self.balances.write().unwrap_or_else(|e| e.into_inner());
        table.set_default(network, name)
    }

    /// Rebinds the default broadcast backend.
    pub fn set_default_broadcast_provider(&self, network: Network, name: &str) -> Result<()> {
        let mut table = self.pushtx.write().unwrap_or_else(|e| e.into_inner());
        table.set_default(network, name)
    }

    /// Looks up a fee backend by name, or the default when `name` is `None`.
    pub fn fee_provider(
        &self,
        network: Network,
        name: Option<&str>,
    ) -> Result<Arc<dyn FeeProvider>> {
        let table = self.fees.read().unwrap_or_else(|e| e.into_inner());
        table.get(network, name)
    }

    /// Looks up a UTXO backend.
    pub fn utxo_provider(
        &self,
        network: Network,
        name: Option<&str>,
    ) -> Result<Arc<dyn UtxoProvider>> {
        let table = self.utxos.read().unwrap_or_else(|e| e.into_inner());
        table.get(network, name)
    }

    /// Looks up a balance backend.
    pub fn balance_provider(
        &self,
        network: Network,
        name: Option<&str>,
    ) -> Result<Arc<dyn BalanceProvider>> {
        let table = self.balances.read().unwrap_or_else(|e| e.into_inner());
        table.get(network, name)
    }

    /// Looks up a broadcast backend.
    pub fn broadcast_provider(
        &self,
        network: Network,
        name: Option<&str>,
    ) -> Result<Arc<dyn BroadcastProvider>> {
        let table = self.pushtx.read().unwrap_or_else(|e| e.into_inner());
        table.get(network, name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

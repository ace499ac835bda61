//! Payment orchestration.
//!
//! [`send_transaction`] drives the full pipeline: validate the request, fetch
//! the fee rate and spendable outputs concurrently, pick inputs, size the
//! transaction, assemble and sign it, and either return the raw hex (dry run)
//! or hand it to a broadcast backend.

use crate::assembly::assemble_signed_tx;
use crate::errors::SendsatsError;
use crate::fees::{fee_for_transaction, resolve_fee_rate, FeeRequest};
use crate::providers::ProviderRegistry;
use crate::selection::select_utxos;
use crate::types::Network;
use crate::Result;

/// Confirmations an output needs before the selector will spend it.
pub const DEFAULT_MIN_CONFIRMATIONS: u64 = 6;

/// A request to move satoshis from one address to another.
///
/// Built with [`SendRequest::new`] plus the `with_*` methods. Provider names
/// are optional; unset slots resolve to each capability's default backend.
#[derive(Clone, Debug)]
pub struct SendRequest {
    /// Sending address. Its UTXOs fund the payment and receive the change.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Amount to send, in satoshis. The miner fee is taken out of this.
    pub amount_sats: u64,
    /// WIF-encoded private key controlling `from`.
    pub private_key_wif: String,
    /// Network the payment happens on.
    pub network: Network,
    /// Fee policy, either a named tier or an explicit sat/byte rate.
    pub fee: FeeRequest,
    /// Confirmation threshold for spendable outputs.
    pub min_confirmations: u64,
    /// When set, return the signed hex instead of broadcasting.
    pub dry_run: bool,
    /// Named fee backend override.
    pub fee_provider: Option<String>,
    /// Named UTXO backend override.
    pub utxo_provider: Option<String>,
    /// Named broadcast backend override.
    pub broadcast_provider: Option<String>,
}

impl SendRequest {
    /// Create a mainnet request with default fee tier and confirmation depth.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount_sats: u64,
        private_key_wif: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount_sats,
            private_key_wif: private_key_wif.into(),
            network: Network::default(),
            fee: FeeRequest::default(),
            min_confirmations: DEFAULT_MIN_CONFIRMATIONS,
            dry_run: false,
            fee_provider: None,
            utxo_provider: None,
            broadcast_provider: None,
        }
    }

    /// Set the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the fee policy.
    pub fn with_fee(mut self, fee: impl Into<FeeRequest>) -> Self {
        self.fee = fee.into();
        self
    }

    /// Set the confirmation threshold for spendable outputs.
    pub fn with_min_confirmations(mut self, confirmations: u64) -> Self {
        self.min_confirmations = confirmations;
        self
    }

    /// Sign but do not broadcast.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Use a named fee backend instead of the default.
    pub fn with_fee_provider(mut self, name: impl Into<String>) -> Self {
        self.fee_provider = Some(name.into());
        self
    }

    /// Use a named UTXO backend instead of the default.
    pub fn with_utxo_provider(mut self, name: impl Into<String>) -> Self {
        self.utxo_provider = Some(name.into());
        self
    }

    /// Use a named broadcast backend instead of the default.
    pub fn with_broadcast_provider(mut self, name: impl Into<String>) -> Self {
        self.broadcast_provider = Some(name.into());
        self
    }

    /// Check the request shape before any network traffic.
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(SendsatsError::validation("from", "sending address is empty"));
        }
        if self.to.trim().is_empty() {
            return Err(SendsatsError::validation("to", "recipient address is empty"));
        }
        if self.private_key_wif.trim().is_empty() {
            return Err(SendsatsError::validation(
                "private_key_wif",
                "private key is empty",
            ));
        }
        if self.amount_sats == 0 {
            return Err(SendsatsError::validation(
                "amount_sats",
                "amount must be greater than zero",
            ));
        }
        if let FeeRequest::Rate(rate) = self.fee {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SendsatsError::validation(
                    "fee",
                    format!("fee rate {rate} is not a usable sat/byte value"),
                ));
            }
        }
        Ok(())
    }
}

/// What a send produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Dry run, nothing hit the network. Carries the signed transaction hex.
    DryRun { tx_hex: String },
    /// Broadcast submitted. `ack` is whatever the backend returned,
    /// normally the txid.
    Broadcast { ack: String, tx_hex: String },
}

impl SendOutcome {
    /// The signed transaction hex, regardless of how the send ended.
    pub fn tx_hex(&self) -> &str {
        match self {
            Self::DryRun { tx_hex } | Self::Broadcast { tx_hex, .. } => tx_hex,
        }
    }
}

/// Execute a payment end to end.
///
/// The fee rate and the UTXO set are fetched concurrently; everything after
/// that is pure computation until the optional broadcast. Fails with
/// [`SendsatsError::InsufficientFunds`] when confirmed outputs cannot cover
/// the amount, and with [`SendsatsError::FeeExceedsAmount`] when the miner
/// fee would consume the entire payment.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        skip(registry, request),
        fields(network = %request.network, amount_sats = request.amount_sats, dry_run = request.dry_run)
    )
)]
pub async fn send_transaction(
    registry: &ProviderRegistry,
    request: SendRequest,
) -> Result<SendOutcome> {
    request.validate()?;

    let fee_backend = registry.fee_provider(request.network, request.fee_provider.as_deref())?;
    let utxo_backend = registry.utxo_provider(request.network, request.utxo_provider.as_deref())?;

    let (fee_rate, utxos) = tokio::try_join!(
        resolve_fee_rate(&request.fee, fee_backend.as_ref()),
        utxo_backend.utxos(&request.from),
    )?;

    let selection = select_utxos(utxos, request.amount_sats, request.min_confirmations);
    if !selection.covers(request.amount_sats) {
        return Err(SendsatsError::InsufficientFunds {
            required_sats: request.amount_sats,
            available_sats: selection.total_sats,
        });
    }

    let change_sats = selection.total_sats - request.amount_sats;
    let num_outputs = if change_sats > 0 { 2 } else { 1 };
    let fee_sats = fee_for_transaction(selection.chosen.len() as u64, num_outputs, fee_rate);
    if fee_sats >= request.amount_sats {
        return Err(SendsatsError::FeeExceedsAmount {
            fee_sats,
            amount_sats: request.amount_sats,
        });
    }

    // The fee comes out of the recipient's output; change returns in full.
    let mut outputs = vec![(request.to.clone(), request.amount_sats - fee_sats)];
    if change_sats > 0 {
        outputs.push((request.from.clone(), change_sats));
    }

    let tx_hex = assemble_signed_tx(
        request.network,
        &selection.chosen,
        &outputs,
        &request.private_key_wif,
    )?;

    if request.dry_run {
        #[cfg(feature = "tracing")]
        tracing::debug!(bytes = tx_hex.len() / 2, "dry run, skipping broadcast");
        return Ok(SendOutcome::DryRun { tx_hex });
    }

    let broadcast_backend =
        registry.broadcast_provider(request.network, request.broadcast_provider.as_deref())?;
    let ack = broadcast_backend.broadcast(&tx_hex).await?;

    #[cfg(feature = "tracing")]
    tracing::info!(%ack, "transaction broadcast");

    Ok(SendOutcome::Broadcast { ack, tx_hex })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::FeeTier;

    fn request() -> SendRequest {
        SendRequest::new("1from", "1to", 10_000, "wif")
    }

    #[test]
    fn builders_set_fields() {
        let req = request()
            .with_network(Network::Testnet)
            .with_fee(FeeTier::Hour)
            .with_min_confirmations(1)
            .dry_run()
            .with_utxo_provider("mempool");
        assert_eq!(req.network, Network::Testnet);
        assert_eq!(req.fee, FeeRequest::Tier(FeeTier::Hour));
        assert_eq!(req.min_confirmations, 1);
        assert!(req.dry_run);
        assert_eq!(req.utxo_provider.as_deref(), Some("mempool"));
        assert!(req.fee_provider.is_none());
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let mut req = request();
        req.from = "  ".into();
        assert!(matches!(
            req.validate(),
            Err(SendsatsError::Validation { field: "from", .. })
        ));

        let mut req = request();
        req.to = String::new();
        assert!(matches!(
            req.validate(),
            Err(SendsatsError::Validation { field: "to", .. })
        ));

        let mut req = request();
        req.private_key_wif = String::new();
        assert!(matches!(
            req.validate(),
            Err(SendsatsError::Validation {
                field: "private_key_wif",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_amount_and_bad_rate() {
        let mut req = request();
        req.amount_sats = 0;
        assert!(matches!(
            req.validate(),
            Err(SendsatsError::Validation {
                field: "amount_sats",
                ..
            })
        ));

        assert!(request().with_fee(-1.0).validate().is_err());
        assert!(request().with_fee(f64::NAN).validate().is_err());
        assert!(request().with_fee(2.5).validate().is_ok());
    }

    #[test]
    fn outcome_exposes_hex() {
        let dry = SendOutcome::DryRun {
            tx_hex: "aa".into(),
        };
        assert_eq!(dry.tx_hex(), "aa");

        let sent = SendOutcome::Broadcast {
            ack: "txid".into(),
            tx_hex: "bb".into(),
        };
        assert_eq!(sent.tx_hex(), "bb");
    }
}

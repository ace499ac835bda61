//! Sendsats library.
//!
//! On-chain bitcoin payment orchestration over pluggable block explorer
//! backends. The crate holds no keys and no connections of its own: backends
//! are registered per capability and network, and signing happens locally
//! from a caller-supplied WIF key.
//!
//! # Features
//!
//! - **Provider Registry**: Fee, UTXO, balance, and broadcast backends keyed
//!   by network and name, with per-network defaults
//! - **Payment Pipeline**: Concurrent fee and UTXO fetch, greedy coin
//!   selection, local signing, optional dry run
//! - **Esplora Backends**: Ready-made Blockstream and mempool.space clients
//!
//! # Example
//!
//! ```ignore
//! use sendsats_lib::{send_transaction, FeeTier, ProviderRegistry, SendRequest};
//!
//! let registry = ProviderRegistry::with_defaults()?;
//!
//! let request = SendRequest::new("1From...", "1To...", 50_000, "Kwd...")
//!     .with_fee(FeeTier::HalfHour)
//!     .dry_run();
//!
//! let outcome = send_transaction(&registry, request).await?;
//! println!("signed: {}", outcome.tx_hex());
//! ```

pub mod assembly;
pub mod balance;
pub mod errors;
pub mod fees;
pub mod providers;
pub mod selection;
pub mod send;
pub mod types;

pub use assembly::assemble_signed_tx;
pub use balance::get_balance;
pub use errors::SendsatsError;
pub use fees::{
    estimate_tx_bytes, fee_for_transaction, resolve_fee_rate, FeeRequest, FeeTier,
    OUTPUT_BYTES, P2PKH_INPUT_BYTES, TX_OVERHEAD_BYTES,
};
pub use providers::{
    BalanceProvider, BroadcastProvider, Capability, EsploraClient, EsploraConfig, FeeProvider,
    MempoolFeeProvider, ProviderRegistry, UtxoProvider,
};
pub use selection::{select_utxos, Selection};
pub use send::{send_transaction, SendOutcome, SendRequest, DEFAULT_MIN_CONFIRMATIONS};
pub use types::{Network, UnspentOutput, SATS_PER_BTC};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SendsatsError>;

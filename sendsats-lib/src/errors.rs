//! Error types for sendsats operations.
//!
//! Every failure surfaces to the immediate caller of
//! [`send_transaction`](crate::send::send_transaction) or
//! [`get_balance`](crate::balance::get_balance); the library never retries
//! on its own.

use crate::providers::Capability;
use crate::types::Network;

/// Comprehensive error type for sendsats operations.
#[derive(Debug, thiserror::Error)]
pub enum SendsatsError {
    /// A required request field is absent or malformed. Raised before any I/O.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Field or parameter name.
        field: &'static str,
        /// Reason for invalidity.
        reason: String,
    },

    /// Requested (capability, network, name) is not registered.
    #[error("no {capability} provider {name:?} registered for {network}")]
    UnknownProvider {
        /// Capability that was looked up.
        capability: Capability,
        /// Network the lookup was scoped to.
        network: Network,
        /// Requested backend name, or the default-slot placeholder.
        name: String,
    },

    /// A provider call returned a response missing required fields or malformed.
    #[error("provider response invalid: {0}")]
    ProviderResponse(String),

    /// Selected inputs cannot cover the requested amount at the given
    /// confirmation threshold.
    #[error("insufficient funds: need {required_sats} sat but only {available_sats} sat of confirmed inputs")]
    InsufficientFunds {
        /// Amount the caller asked to send.
        required_sats: u64,
        /// Total of the confirmed inputs that were available.
        available_sats: u64,
    },

    /// Computed fee meets or exceeds the requested amount.
    #[error("fee of {fee_sats} sat would consume the whole {amount_sats} sat payment")]
    FeeExceedsAmount {
        /// Fee computed from the size estimate and fee rate.
        fee_sats: u64,
        /// Amount the caller asked to send.
        amount_sats: u64,
    },

    /// Underlying transport failure from a provider call.
    #[error("network error: {0}")]
    Network(String),

    /// The transaction-assembly collaborator rejected its input.
    #[error("transaction assembly failed: {0}")]
    Assembly(String),
}

impl SendsatsError {
    /// Create a validation error.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Create an unknown-provider error; `name` is `None` for default lookups.
    pub(crate) fn unknown_provider(
        capability: Capability,
        network: Network,
        name: Option<&str>,
    ) -> Self {
        Self::UnknownProvider {
            capability,
            network,
            name: name.unwrap_or("default").to_string(),
        }
    }
}

impl From<reqwest::Error> for SendsatsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::ProviderResponse(format!("undecodable body: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_funds() {
        let err = SendsatsError::InsufficientFunds {
            required_sats: 1000,
            available_sats: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("insufficient funds"));
        assert!(msg.contains("1000"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn display_unknown_provider_default_slot() {
        let err = SendsatsError::unknown_provider(Capability::Fees, Network::Testnet, None);
        assert!(err.to_string().contains("fees"));
        assert!(err.to_string().contains("default"));
        assert!(err.to_string().contains("testnet"));
    }

    #[test]
    fn validation_helper() {
        let err = SendsatsError::validation("amount_sats", "must be greater than zero");
        assert!(matches!(err, SendsatsError::Validation { field: "amount_sats", .. }));
    }
}

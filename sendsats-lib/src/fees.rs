//! Fee requests, fee-rate resolution, and the transaction size heuristic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SendsatsError;
use crate::providers::FeeProvider;
use crate::Result;

/// Estimated serialized size of a legacy P2PKH input, in bytes.
pub const P2PKH_INPUT_BYTES: u64 = 180;

/// Estimated serialized size of any output, in bytes.
pub const OUTPUT_BYTES: u64 = 34;

/// Fixed transaction overhead: version + locktime + counts.
pub const TX_OVERHEAD_BYTES: u64 = 10;

/// Named processing-speed tier understood by fee providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeTier {
    /// Aim for inclusion in the next block.
    Fastest,
    /// Aim for inclusion within roughly thirty minutes.
    HalfHour,
    /// Aim for inclusion within roughly an hour.
    Hour,
}

impl FeeTier {
    /// Wire name of the tier, matching the recommended-fees field prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::HalfHour => "halfHour",
            Self::Hour => "hour",
        }
    }

    /// Confirmation target in blocks, for estimate-style fee APIs.
    pub fn confirmation_target(&self) -> u32 {
        match self {
            Self::Fastest => 1,
            Self::HalfHour => 3,
            Self::Hour => 6,
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeeTier {
    type Err = SendsatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fastest" => Ok(Self::Fastest),
            "halfHour" | "half-hour" => Ok(Self::HalfHour),
            "hour" => Ok(Self::Hour),
            other => Err(SendsatsError::validation(
                "fee",
                format!("unknown fee tier {other:?}, expected fastest, halfHour or hour"),
            )),
        }
    }
}

/// What the caller wants to pay: a named speed tier, or a literal rate.
#[derive(Clone, Debug, PartialEq)]
pub enum FeeRequest {
    /// Symbolic tier, resolved through a fee provider.
    Tier(FeeTier),
    /// Explicit rate in satoshis per byte; used as-is, no I/O.
    Rate(f64),
}

impl Default for FeeRequest {
    fn default() -> Self {
        Self::Tier(FeeTier::Fastest)
    }
}

impl From<FeeTier> for FeeRequest {
    fn from(tier: FeeTier) -> Self {
        Self::Tier(tier)
    }
}

impl From<f64> for FeeRequest {
    fn from(rate: f64) -> Self {
        Self::Rate(rate)
    }
}

/// Resolve a fee request to a concrete sat/byte rate.
///
/// An explicit [`FeeRequest::Rate`] is returned unchanged and never touches
/// the provider. A tier is looked up through the provider; a negative or
/// non-finite provider value is a [`SendsatsError::ProviderResponse`].
pub async fn resolve_fee_rate(request: &FeeRequest, provider: &dyn FeeProvider) -> Result<f64> {
    match request {
        FeeRequest::Rate(rate) => Ok(*rate),
        FeeRequest::Tier(tier) => {
            let rate = provider.fee_rate(*tier).await?;
            if !rate.is_finite() || rate < 0.0 {
                return Err(SendsatsError::ProviderResponse(format!(
                    "fee provider returned invalid rate {rate} for tier {tier}"
                )));
            }
            Ok(rate)
        }
    }
}

/// Closed-form serialized-size heuristic for a legacy P2PKH transaction.
///
/// Not a precise serializer: 180 bytes per input, 34 per output, 10 bytes of
/// fixed overhead, plus one byte per input for the signature-length field.
/// Used only to size the fee, never to build real bytes.
pub fn estimate_tx_bytes(num_inputs: u64, num_outputs: u64) -> u64 {
    num_inputs * P2PKH_INPUT_BYTES + num_outputs * OUTPUT_BYTES + TX_OVERHEAD_BYTES + num_inputs
}

/// Total fee in satoshis for the given shape at `rate` sat/byte, rounded up.
pub fn fee_for_transaction(num_inputs: u64, num_outputs: u64, rate: f64) -> u64 {
    (estimate_tx_bytes(num_inputs, num_outputs) as f64 * rate).ceil() as u64
}

//! Aggregator quote and holding types.

use crate::chain::ChainId;
use crate::utils::current_timestamp;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Freshness window for quotes without an embedded expiry, in seconds.
///
/// Generic aggregator quotes age out quickly; past this window the quote
/// must be re-requested before its call data is submitted.
pub const QUOTE_FRESHNESS_SECS: u64 = 24;

/// A single contract call: target, calldata and attached native value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSpec {
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
}

impl CallSpec {
	/// A bare native-value transfer carrying no calldata.
	pub fn value_transfer(to: Address, value: U256) -> Self {
		Self {
			to,
			data: Bytes::new(),
			value,
		}
	}

	/// True if this call moves native currency.
	pub fn has_value(&self) -> bool {
		!self.value.is_zero()
	}
}

/// One token holding in a user's cross-chain balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
	pub chain: ChainId,
	pub token: Address,
	pub amount: U256,
	/// Native-currency holdings need no ERC-20 approval and are weighted
	/// first during auto source selection.
	pub is_native: bool,
}

/// A priced swap returned by an aggregator for one chain and one user.
///
/// Quotes are time-bounded: a quote older than [`QUOTE_FRESHNESS_SECS`]
/// (or past its own `expires_at`) must be re-requested before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
	pub chain: ChainId,
	pub input_token: Address,
	pub output_token: Address,
	pub input_amount: U256,
	/// Slippage-bounded minimum output the aggregator guarantees.
	pub output_amount_min: U256,
	/// Aggregator-embedded expiry (unix seconds), when it provides one.
	pub expires_at: Option<u64>,
	/// When this quote was fetched (unix seconds).
	pub fetched_at: u64,
	/// Opaque transaction payload produced by the aggregator.
	pub call: CallSpec,
}

impl Quote {
	/// Whether the quote is too old to submit as-is.
	pub fn is_stale(&self, now: u64) -> bool {
		if let Some(expiry) = self.expires_at {
			if now >= expiry {
				return true;
			}
		}
		now.saturating_sub(self.fetched_at) > QUOTE_FRESHNESS_SECS
	}

	/// Whether the quote is stale right now.
	pub fn is_stale_now(&self) -> bool {
		self.is_stale(current_timestamp())
	}
}

//! Cross-chain fund-movement intent types.
//!
//! An intent records the request to move the common token from N source
//! chains to one destination chain on the external coordination ledger.
//! The all-zero intent id marks the skip-bridge path: no movement was
//! required and fulfillment resolves immediately.

use crate::chain::ChainId;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Fill status of a recorded intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
	Unfilled,
	Filled,
}

/// Parameters for recording a fund-movement intent, produced by the
/// planner and finalized by the orchestrator once realized source
/// outputs are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentParams {
	/// Per-source-chain COT deposits.
	pub sources: Vec<(ChainId, U256)>,
	pub destination_chain: ChainId,
	pub destination_token: Address,
	pub destination_amount: U256,
	pub recipient: Address,
}

impl IntentParams {
	/// Total COT deposited across all source chains.
	pub fn total_deposit(&self) -> U256 {
		self.sources.iter().fold(U256::ZERO, |acc, (_, a)| acc + *a)
	}

	/// Returns a copy with deposit amounts replaced by realized
	/// source-swap outputs, so the recorded intent reflects settled
	/// reality rather than planning-time quotes.
	pub fn with_realized_sources(&self, realized: &[(ChainId, U256)]) -> Self {
		let mut params = self.clone();
		for (chain, amount) in &mut params.sources {
			if let Some((_, actual)) = realized.iter().find(|(c, _)| c == chain) {
				*amount = *actual;
			}
		}
		params
	}
}

/// A recorded fund-movement intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMovementIntent {
	pub params: IntentParams,
	/// Ledger-assigned id; all-zero means no movement was required.
	pub intent_id: B256,
	pub status: IntentStatus,
}

impl FundMovementIntent {
	/// Whether this intent is the skip-bridge placeholder.
	pub fn is_skip_bridge(&self) -> bool {
		self.intent_id == B256::ZERO
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params() -> IntentParams {
		IntentParams {
			sources: vec![(ChainId(1), U256::from(100)), (ChainId(2), U256::from(50))],
			destination_chain: ChainId(9),
			destination_token: Address::ZERO,
			destination_amount: U256::from(140),
			recipient: Address::ZERO,
		}
	}

	#[test]
	fn total_deposit_sums_sources() {
		assert_eq!(params().total_deposit(), U256::from(150));
	}

	#[test]
	fn realized_sources_replace_quoted_amounts() {
		let updated = params().with_realized_sources(&[(ChainId(1), U256::from(97))]);
		assert_eq!(updated.sources[0], (ChainId(1), U256::from(97)));
		// Untouched chains keep the planned amount.
		assert_eq!(updated.sources[1], (ChainId(2), U256::from(50)));
	}

	#[test]
	fn zero_intent_id_is_skip_bridge() {
		let intent = FundMovementIntent {
			params: params(),
			intent_id: B256::ZERO,
			status: IntentStatus::Filled,
		};
		assert!(intent.is_skip_bridge());
	}
}

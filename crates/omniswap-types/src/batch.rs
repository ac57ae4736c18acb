//! Batched-call types for single-signature delegated execution.
//!
//! A [`BatchedCall`] is an ordered call list for one chain that the vault
//! contract executes atomically (`revert_on_failure` is always set).
//! Signing it with the ephemeral key yields a [`SignedBatchedCall`],
//! optionally carrying a one-time [`DelegationGrant`] when the ephemeral
//! account has not yet delegated execution on that chain.

use crate::chain::ChainId;
use crate::quote::CallSpec;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// One call inside a batch. Same shape as [`CallSpec`] but kept separate
/// because batch calls are hashed into the EIP-712 structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
	pub to: Address,
	pub value: U256,
	pub data: Bytes,
}

impl From<CallSpec> for Call {
	fn from(spec: CallSpec) -> Self {
		Self {
			to: spec.to,
			value: spec.value,
			data: spec.data,
		}
	}
}

/// An unsigned batch of calls for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchedCall {
	pub chain: ChainId,
	pub calls: Vec<Call>,
	/// Always true: the chain executes all calls or none.
	pub revert_on_failure: bool,
	/// Fresh 192-bit random nonce, chain-scoped.
	pub nonce: U256,
	/// Always `U256::MAX`: the signature does not expire.
	pub deadline: U256,
}

impl BatchedCall {
	/// Builds a batch with the fixed policy fields set.
	pub fn new(chain: ChainId, calls: Vec<Call>, nonce: U256) -> Self {
		Self {
			chain,
			calls,
			revert_on_failure: true,
			nonce,
			deadline: U256::MAX,
		}
	}

	/// Total native value attached across all calls.
	pub fn total_value(&self) -> U256 {
		self.calls.iter().fold(U256::ZERO, |acc, c| acc + c.value)
	}
}

/// One-time chain-scoped authorization letting the vault contract act as
/// the ephemeral signer's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationGrant {
	pub chain: ChainId,
	pub delegate: Address,
	pub authority: Address,
	/// 65-byte signature by the ephemeral key.
	pub signature: Bytes,
}

/// A signed batch ready for relay submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBatchedCall {
	pub batch: BatchedCall,
	/// 65-byte EIP-712 signature by the ephemeral key over the chain's
	/// vault domain.
	pub signature: Bytes,
	/// Present only when the ephemeral account has not yet delegated
	/// execution to the vault on this chain.
	pub authorization: Option<DelegationGrant>,
}

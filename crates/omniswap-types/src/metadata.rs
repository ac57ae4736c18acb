//! Append-only audit metadata for completed executions.

use crate::chain::ChainId;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Summary of one executed leg for the audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegSummary {
	pub chain: ChainId,
	pub input_token: Address,
	pub input_amount: U256,
	pub tx_hash: B256,
}

/// Write-once audit record for one plan execution, EIP-712-signed by the
/// ephemeral key and persisted best-effort: a failed write is logged and
/// never fails the swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapMetadata {
	pub source_legs: Vec<LegSummary>,
	pub destination_leg: Option<LegSummary>,
	/// All-zero for skip-bridge executions.
	pub intent_id: B256,
	/// 65-byte ephemeral-key signature over the record digest.
	pub signature: Bytes,
}

//! Progress events emitted during plan execution.
//!
//! The orchestrator publishes these on a broadcast bus so a caller can
//! render progress without polling. Event order matches phase order
//! exactly: source swaps, fund movement, destination swap, completion.

use crate::chain::ChainId;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Discrete progress events for one plan execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapEvent {
	/// Ephemeral-key signing of a batch (and any delegation grant) began.
	PermitSigningStarted { chain: ChainId },
	/// Signing finished; the batch is ready for submission.
	PermitSigningDone { chain: ChainId },
	/// A batch (or direct transaction set) was handed to the relay/chain.
	BatchSubmissionStarted { chain: ChainId },
	/// The relay acknowledged the batch with a transaction hash.
	BatchSubmissionDone { chain: ChainId, tx_hash: B256 },
	/// A source chain's transaction reached the confirmation depth.
	SourceChainConfirmed { chain: ChainId, tx_hash: B256 },
	/// The fund-movement intent was recorded on the coordination ledger.
	IntentRecorded { intent_id: B256 },
	/// The coordination ledger confirmed fulfillment.
	IntentFilled { intent_id: B256 },
	/// The destination swap and final sweep confirmed.
	DestinationConfirmed { chain: ChainId, tx_hash: B256 },
	/// Residual funds on a chain were swept back to the user.
	SweepPerformed { chain: ChainId, tx_hash: B256 },
	/// The whole plan completed.
	Completed,
}

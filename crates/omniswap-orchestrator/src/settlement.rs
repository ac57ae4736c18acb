//! Confirmation-depth settlement tracking.
//!
//! A submitted transaction counts as settled once its receipt exists,
//! reports success, and the chain head has advanced the configured
//! number of blocks past its inclusion block.

use alloy_primitives::B256;
use omniswap_types::{ChainClient, ClientError, TransactionReceipt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while awaiting settlement.
#[derive(Debug, Error)]
pub enum SettlementError {
	/// The transaction was included but reverted.
	#[error("transaction {hash} reverted in block {block_number}")]
	Reverted { hash: B256, block_number: u64 },
	/// The transaction did not reach the confirmation depth in time.
	#[error("transaction {hash} unconfirmed after {waited:?}")]
	Timeout { hash: B256, waited: Duration },
	/// An underlying chain read failed.
	#[error(transparent)]
	Client(#[from] ClientError),
}

/// Settlement tuning.
#[derive(Debug, Clone, Copy)]
pub struct SettlementConfig {
	/// Blocks past inclusion before a transaction counts as settled.
	pub confirmations: u64,
	/// Receipt polling interval.
	pub poll_interval: Duration,
	/// Overall per-transaction deadline.
	pub timeout: Duration,
}

impl Default for SettlementConfig {
	fn default() -> Self {
		Self {
			confirmations: 2,
			poll_interval: Duration::from_secs(2),
			timeout: Duration::from_secs(180),
		}
	}
}

/// Polls until `hash` settles at the configured depth.
pub async fn wait_for_settlement(
	client: &Arc<dyn ChainClient>,
	hash: B256,
	config: &SettlementConfig,
) -> Result<TransactionReceipt, SettlementError> {
	let deadline = tokio::time::Instant::now() + config.timeout;
	loop {
		if let Some(receipt) = client.get_transaction_receipt(hash).await? {
			if !receipt.success {
				return Err(SettlementError::Reverted {
					hash,
					block_number: receipt.block_number,
				});
			}
			let head = client.get_block_number().await?;
			if head >= receipt.block_number + config.confirmations.saturating_sub(1) {
				tracing::debug!(%hash, block = receipt.block_number, head, "transaction settled");
				return Ok(receipt);
			}
		}
		if tokio::time::Instant::now() >= deadline {
			return Err(SettlementError::Timeout {
				hash,
				waited: config.timeout,
			});
		}
		tokio::time::sleep(config.poll_interval).await;
	}
}

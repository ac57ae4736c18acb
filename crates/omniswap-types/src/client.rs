//! The chain-scoped client boundary.
//!
//! Low-level JSON-RPC transport, ABI plumbing and wallet glue live
//! outside this system; components talk to each chain through the
//! [`ChainClient`] trait. Each client instance is scoped to exactly one
//! chain, so no method takes a chain id.

use crate::chain::ChainId;
use crate::quote::CallSpec;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by a per-chain client.
#[derive(Debug, Error)]
pub enum ClientError {
	/// Transport-level failure talking to the chain.
	#[error("rpc error: {0}")]
	Rpc(String),
	/// The submitted transaction was rejected or reverted.
	#[error("transaction rejected: {0}")]
	Rejected(String),
	/// The user's wallet refused a signing or chain-switch request.
	#[error("wallet error: {0}")]
	Wallet(String),
}

/// Current fee estimate for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
	pub max_fee_per_gas: U256,
	pub max_priority_fee_per_gas: U256,
}

/// Receipt for an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	pub hash: B256,
	pub block_number: u64,
	pub success: bool,
}

/// Minimal chain-scoped client contract.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ChainClient: Send + Sync {
	/// The chain this client is scoped to.
	fn chain_id(&self) -> ChainId;

	/// Executes a read-only contract call.
	async fn call(&self, call: &CallSpec) -> Result<Bytes, ClientError>;

	/// Current fee estimate for this chain.
	async fn estimate_fees_per_gas(&self) -> Result<FeeEstimate, ClientError>;

	/// Deployed code at an address (empty for EOAs without delegation).
	async fn get_code(&self, address: Address) -> Result<Bytes, ClientError>;

	/// ERC-20 allowance granted by `owner` to `spender` for `token`.
	async fn get_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, ClientError>;

	/// Token balance of `address`; `None` token means the native currency.
	async fn get_balance(&self, address: Address, token: Option<Address>)
		-> Result<U256, ClientError>;

	/// Receipt for a transaction, `None` while still pending.
	async fn get_transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, ClientError>;

	/// Latest block number.
	async fn get_block_number(&self) -> Result<u64, ClientError>;

	/// Signs and submits a transaction with the user's primary key.
	async fn send_transaction(&self, call: &CallSpec) -> Result<B256, ClientError>;

	/// Signs an EIP-712 digest with the user's primary key.
	async fn sign_typed_data(&self, digest: B256) -> Result<Bytes, ClientError>;

	/// Asks the user's wallet to switch its active chain before a direct
	/// submission.
	async fn switch_chain(&self) -> Result<(), ClientError>;
}

/// Shared per-chain client handles, keyed by chain id.
pub type ClientMap = HashMap<ChainId, Arc<dyn ChainClient>>;

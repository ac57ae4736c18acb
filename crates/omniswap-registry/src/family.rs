//! Per-universe call construction.
//!
//! Chains sharing one account model share one [`ChainFamily`]
//! implementation. The family is selected once per chain by the
//! registry; callers hold the capability object and never branch on the
//! universe tag themselves.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use omniswap_types::CallSpec;
use thiserror::Error;

sol! {
	interface IERC20 {
		function transfer(address to, uint256 amount) external returns (bool);
		function approve(address spender, uint256 amount) external returns (bool);
		function transferFrom(address from, address to, uint256 amount) external returns (bool);
	}
}

/// Errors raised while constructing family-specific calls.
#[derive(Debug, Error)]
pub enum FamilyError {
	/// The operation has no representation on this chain family.
	#[error("operation not supported on this chain family: {0}")]
	Unsupported(&'static str),
}

/// Call-construction capability shared by all chains of one universe.
pub trait ChainFamily: Send + Sync {
	/// Builds a transfer of `amount` of `token` to `to`. `None` token
	/// means the native currency.
	fn build_transfer(
		&self,
		token: Option<Address>,
		to: Address,
		amount: U256,
	) -> Result<CallSpec, FamilyError>;

	/// Builds an ERC-20 style approval of `spender` for `amount`.
	fn build_approval(
		&self,
		token: Address,
		spender: Address,
		amount: U256,
	) -> Result<CallSpec, FamilyError>;

	/// Builds the sweep returning a full balance to `to`. Identical to a
	/// transfer on account-model chains; UTXO chains drain inputs.
	fn build_sweep(
		&self,
		token: Option<Address>,
		to: Address,
		amount: U256,
	) -> Result<CallSpec, FamilyError> {
		self.build_transfer(token, to, amount)
	}

	/// Whether the family supports arbitrary contract calls (and thus
	/// on-chain swaps and batched execution).
	fn supports_contract_calls(&self) -> bool;
}

/// Account-based EVM-style chains.
pub struct EvmFamily;

impl ChainFamily for EvmFamily {
	fn build_transfer(
		&self,
		token: Option<Address>,
		to: Address,
		amount: U256,
	) -> Result<CallSpec, FamilyError> {
		Ok(match token {
			Some(token) => CallSpec {
				to: token,
				data: Bytes::from(IERC20::transferCall { to, amount }.abi_encode()),
				value: U256::ZERO,
			},
			None => CallSpec::value_transfer(to, amount),
		})
	}

	fn build_approval(
		&self,
		token: Address,
		spender: Address,
		amount: U256,
	) -> Result<CallSpec, FamilyError> {
		Ok(CallSpec {
			to: token,
			data: Bytes::from(IERC20::approveCall { spender, amount }.abi_encode()),
			value: U256::ZERO,
		})
	}

	fn supports_contract_calls(&self) -> bool {
		true
	}
}

/// UTXO-style chains: value transfers only.
pub struct UtxoFamily;

impl ChainFamily for UtxoFamily {
	fn build_transfer(
		&self,
		token: Option<Address>,
		to: Address,
		amount: U256,
	) -> Result<CallSpec, FamilyError> {
		if token.is_some() {
			return Err(FamilyError::Unsupported("token transfers"));
		}
		Ok(CallSpec::value_transfer(to, amount))
	}

	fn build_approval(
		&self,
		_token: Address,
		_spender: Address,
		_amount: U256,
	) -> Result<CallSpec, FamilyError> {
		Err(FamilyError::Unsupported("approvals"))
	}

	fn supports_contract_calls(&self) -> bool {
		false
	}
}

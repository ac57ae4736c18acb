//! The fee-schedule boundary.
//!
//! Fees are fetched once per planning call as a [`FeeParams`] value and
//! applied locally from then on, so a plan's fee math is a pure function
//! of the fetched parameters.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use omniswap_types::ChainId;
use thiserror::Error;

/// Basis-point denominator used throughout fee math.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Errors surfaced by a fee-schedule provider.
#[derive(Debug, Error)]
pub enum FeeError {
	#[error("fee schedule unavailable: {0}")]
	Unavailable(String),
}

/// Fee parameters fetched once per planning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
	/// Flat fulfillment fee paid to the solver, denominated in the
	/// destination token units the fetch was scoped to.
	pub solver_fee: U256,
	/// Protocol fee in basis points of the total source amount.
	pub protocol_fee_bps: u64,
}

impl FeeParams {
	/// Protocol fee for a given total source amount.
	pub fn protocol_fee(&self, source_amount: U256) -> U256 {
		source_amount * U256::from(self.protocol_fee_bps) / U256::from(BPS_DENOMINATOR)
	}

	/// Total fees folded into a shortfall for a given source amount.
	pub fn total_for(&self, source_amount: U256) -> U256 {
		self.solver_fee + self.protocol_fee(source_amount)
	}
}

/// Fee-schedule capability, fetched once per planning call.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait FeeSchedule: Send + Sync {
	/// Fetches fee parameters scoped to the destination chain and token.
	async fn fetch(
		&self,
		destination_chain: ChainId,
		destination_token: Address,
		decimals: u8,
	) -> Result<FeeParams, FeeError>;
}

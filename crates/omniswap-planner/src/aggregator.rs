//! The aggregator quote boundary.
//!
//! DEX aggregator providers live outside this system; the planner talks
//! to them through this trait. Both query modes are required: exact
//! input (how much comes out of selling this much) and exact output
//! (how much must go in to produce this much).

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use omniswap_types::{CallSpec, ChainId, Quote};
use thiserror::Error;

/// Errors surfaced by an aggregator provider.
#[derive(Debug, Error)]
pub enum AggregatorError {
	/// The provider has no route for the requested pair.
	#[error("no route for pair on chain {chain}: {detail}")]
	NoRoute { chain: ChainId, detail: String },
	/// Transport-level failure talking to the provider.
	#[error("aggregator transport error: {0}")]
	Transport(String),
}

/// Aggregator quote capability.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait Aggregator: Send + Sync {
	/// Prices selling `input_amount` of `input_token` for
	/// `output_token` on `chain`, on behalf of `user`.
	async fn quote_exact_input(
		&self,
		chain: ChainId,
		input_token: Address,
		output_token: Address,
		input_amount: U256,
		user: Address,
	) -> Result<Quote, AggregatorError>;

	/// Prices buying exactly `target_output` of `output_token` with
	/// `input_token` on `chain`, on behalf of `user`.
	async fn quote_exact_output(
		&self,
		chain: ChainId,
		input_token: Address,
		output_token: Address,
		target_output: U256,
		user: Address,
	) -> Result<Quote, AggregatorError>;

	/// Extracts the submittable transaction payload from a quote.
	fn build_call_data(&self, quote: &Quote) -> CallSpec {
		quote.call.clone()
	}
}

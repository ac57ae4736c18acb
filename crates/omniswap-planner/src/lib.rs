//! Route planning for the omniswap engine.
//!
//! Given a destination requirement and a snapshot of balances spread
//! over many chains, the planner produces an ordered execution plan:
//! zero or more source-chain swaps into the common intermediate token,
//! an optional cross-chain fund movement, and an optional
//! destination-chain swap.

use alloy_primitives::U256;
use omniswap_registry::RegistryError;
use omniswap_types::ChainId;
use thiserror::Error;

/// External aggregator quote capability.
pub mod aggregator;
/// External fee-schedule capability.
pub mod fees;
/// The planner itself.
pub mod planner;

pub use aggregator::{Aggregator, AggregatorError};
pub use fees::{FeeError, FeeParams, FeeSchedule};
pub use planner::{PlanRequest, PlannerConfig, RoutePlanner};

/// Planning failures. Nothing on-chain has happened when one of these
/// is returned; re-planning is always safe.
#[derive(Debug, Error)]
pub enum PlannerError {
	/// Chain or COT metadata missing from the registry.
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// The explicitly requested source holding cannot cover the
	/// requirement.
	#[error("insufficient balance: required {required}, available {available}")]
	InsufficientBalance { required: U256, available: U256 },
	/// Auto selection exhausted every candidate holding.
	#[error("no eligible source holdings cover the requirement")]
	NoEligibleSource,
	/// A swap leg was requested on a chain family without contract
	/// calls.
	#[error("on-chain swaps unsupported on chain {0}")]
	UnsupportedOnChainFamily(ChainId),
	/// The aggregator failed to produce a quote.
	#[error(transparent)]
	Aggregator(#[from] AggregatorError),
	/// The fee-schedule provider failed.
	#[error(transparent)]
	Fees(#[from] FeeError),
}

//! Route plans produced by the planner and consumed by the orchestrator.
//!
//! A plan is immutable once produced: re-planning yields a new plan. The
//! destination leg carries a [`RequoteSpec`] — the pure inputs needed to
//! re-derive it later — rather than a closure over planner session state.

use crate::chain::ChainId;
use crate::intent::IntentParams;
use crate::quote::{CallSpec, Holding, Quote};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// What the user asked for: a token on a chain, with either a fixed
/// output amount (exact-output) or open (liquidate sources, deliver what
/// results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
	pub chain: ChainId,
	pub token: Address,
	/// `None` selects exact-input/auto mode.
	pub amount: Option<U256>,
}

/// The swap portion of a source leg: quote plus derived call data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAction {
	pub quote: Quote,
	/// Prior ERC-20 approval, absent for native-currency inputs or when
	/// the cached allowance already covers the input.
	pub approval: Option<CallSpec>,
	pub call: CallSpec,
}

/// One planned source-chain leg: liquidate a holding into the common
/// intermediate token and, when the leg feeds the cross-chain movement,
/// sweep the proceeds to the relay intermediary.
///
/// `swap` is `None` when the holding is already the common token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLeg {
	pub holding: Holding,
	pub swap: Option<SwapAction>,
	/// Whether this leg's proceeds are deposited into the cross-chain
	/// movement (false for legs already on the destination chain).
	pub feeds_bridge: bool,
}

impl SourceLeg {
	/// COT the planner expects this leg to contribute: the quoted minimum
	/// output for swap legs, face value for legs already in COT.
	pub fn expected_output(&self) -> U256 {
		match &self.swap {
			Some(action) => action.quote.output_amount_min,
			None => self.holding.amount,
		}
	}
}

/// The optional destination-chain swap from COT into the target token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationLeg {
	pub quote: Quote,
	pub approval: Option<CallSpec>,
	pub call: CallSpec,
	/// COT input including the planning-time safety buffer; execution may
	/// never spend more than this.
	pub buffered_input: U256,
}

/// Pure inputs for re-deriving the destination leg when its quote goes
/// stale before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequoteSpec {
	pub chain: ChainId,
	pub cot: Address,
	pub output_token: Address,
	pub output_amount: U256,
	/// Safety-margin basis points applied to the quoted input.
	pub buffer_bps: u64,
}

/// A complete ordered execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
	pub target: Target,
	pub source_legs: Vec<SourceLeg>,
	/// `None` on the skip-bridge path.
	pub intent_params: Option<IntentParams>,
	pub dest_leg: Option<DestinationLeg>,
	/// Present whenever `dest_leg` is, for staleness re-derivation.
	pub requote: Option<RequoteSpec>,
}

impl RoutePlan {
	/// Chains carrying at least one source leg, native-holding chains
	/// first (they need no approval and settle fastest).
	pub fn source_chains(&self) -> Vec<ChainId> {
		let mut chains: Vec<ChainId> = Vec::new();
		let mut push = |c: ChainId| {
			if !chains.contains(&c) {
				chains.push(c);
			}
		};
		for leg in self.source_legs.iter().filter(|l| l.holding.is_native) {
			push(leg.holding.chain);
		}
		for leg in self.source_legs.iter().filter(|l| !l.holding.is_native) {
			push(leg.holding.chain);
		}
		chains
	}

	/// Total quoted minimum COT output across all source legs.
	pub fn total_expected_output(&self) -> U256 {
		self.source_legs
			.iter()
			.fold(U256::ZERO, |acc, leg| acc + leg.expected_output())
	}
}

//! The route planner.
//!
//! Two amount modes are supported. Exact-output solves for how much must
//! move to produce a fixed destination amount; exact-input/auto
//! liquidates a chosen or auto-selected set of source holdings and
//! delivers whatever results, minus fees. In both modes COT already
//! sitting on the destination chain offsets what must move, and when the
//! offset covers everything the cross-chain leg is skipped entirely.

use crate::aggregator::Aggregator;
use crate::fees::{FeeParams, FeeSchedule, BPS_DENOMINATOR};
use crate::PlannerError;
use alloy_primitives::{Address, U256};
use omniswap_registry::ChainRegistry;
use omniswap_types::{
	ChainId, DestinationLeg, Holding, IntentParams, RequoteSpec, RoutePlan, SourceLeg, SwapAction,
	Target,
};
use std::sync::Arc;

/// Planner tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
	/// Safety margin applied to the destination swap's quoted input, in
	/// basis points. Absorbs slippage between planning and execution.
	pub dest_buffer_bps: u64,
	/// Extra margin required of auto-selected sources, in basis points
	/// of the shortfall.
	pub selection_margin_bps: u64,
}

impl Default for PlannerConfig {
	fn default() -> Self {
		Self {
			dest_buffer_bps: 200,
			selection_margin_bps: 100,
		}
	}
}

/// One planning request.
#[derive(Debug, Clone)]
pub struct PlanRequest {
	pub target: Target,
	/// The user's cross-chain balance snapshot.
	pub snapshot: Vec<Holding>,
	/// Restricts planning to this single source holding.
	pub source_restriction: Option<Holding>,
	/// The user's primary address (quote beneficiary, sweep target).
	pub user: Address,
	/// The ephemeral delegated signer receiving bridged funds.
	pub recipient: Address,
}

/// Plans cross-chain executions against registry metadata, an
/// aggregator capability and a fee schedule.
pub struct RoutePlanner {
	registry: Arc<ChainRegistry>,
	aggregator: Arc<dyn Aggregator>,
	fees: Arc<dyn FeeSchedule>,
	config: PlannerConfig,
}

fn apply_bps(amount: U256, bps: u64) -> U256 {
	amount * U256::from(BPS_DENOMINATOR + bps) / U256::from(BPS_DENOMINATOR)
}

impl RoutePlanner {
	pub fn new(
		registry: Arc<ChainRegistry>,
		aggregator: Arc<dyn Aggregator>,
		fees: Arc<dyn FeeSchedule>,
		config: PlannerConfig,
	) -> Self {
		Self {
			registry,
			aggregator,
			fees,
			config,
		}
	}

	/// Produces an execution plan for one request.
	pub async fn plan(&self, request: &PlanRequest) -> Result<RoutePlan, PlannerError> {
		let dest_chain = request.target.chain;
		self.registry.require_chain(dest_chain)?;
		let cot = self.registry.cot_required(dest_chain)?;

		match request.target.amount {
			Some(amount) => self.plan_exact_output(request, cot, amount).await,
			None => self.plan_auto(request, cot).await,
		}
	}

	/// Re-derives the destination leg from its pure requote inputs.
	///
	/// Used when the original quote ages past its freshness window (or
	/// its own embedded expiry) before execution; nothing else in the
	/// plan is re-derived.
	pub async fn requote_destination(
		&self,
		spec: &RequoteSpec,
		user: Address,
	) -> Result<DestinationLeg, PlannerError> {
		let quote = self
			.aggregator
			.quote_exact_output(spec.chain, spec.cot, spec.output_token, spec.output_amount, user)
			.await?;
		let buffered_input = apply_bps(quote.input_amount, spec.buffer_bps);
		let family = self.registry.family(spec.chain)?;
		let call = self.aggregator.build_call_data(&quote);
		let approval = family
			.build_approval(spec.cot, call.to, buffered_input)
			.ok();
		Ok(DestinationLeg {
			call,
			approval,
			quote,
			buffered_input,
		})
	}

	/// COT decimals on a chain, defaulting to 18 when the token table
	/// has no entry.
	fn cot_decimals(&self, chain: ChainId, cot: &Address) -> u8 {
		self.registry
			.token_info(chain, cot)
			.map(|t| t.decimals)
			.unwrap_or(18)
	}

	async fn plan_exact_output(
		&self,
		request: &PlanRequest,
		cot: Address,
		amount: U256,
	) -> Result<RoutePlan, PlannerError> {
		let target = &request.target;
		let dest_cot_balance = snapshot_balance(&request.snapshot, target.chain, cot);

		// Destination swap is only needed when the requested token is
		// not the common token itself.
		let (dest_leg, requote, required_cot) = if target.token != cot {
			let spec = RequoteSpec {
				chain: target.chain,
				cot,
				output_token: target.token,
				output_amount: amount,
				buffer_bps: self.config.dest_buffer_bps,
			};
			let leg = self.requote_destination(&spec, request.user).await?;
			let required = leg.buffered_input;
			(Some(leg), Some(spec), required)
		} else {
			(None, None, amount)
		};

		let needed = required_cot.saturating_sub(dest_cot_balance);
		if needed.is_zero() {
			// Skip-bridge fast path: destination balance already covers
			// the buffered requirement.
			tracing::debug!(%target.chain, "destination COT balance covers requirement, skipping bridge");
			return Ok(RoutePlan {
				target: target.clone(),
				source_legs: Vec::new(),
				intent_params: None,
				dest_leg,
				requote,
			});
		}

		let fees = self
			.fees
			.fetch(target.chain, cot, self.cot_decimals(target.chain, &cot))
			.await?;

		let legs = match &request.source_restriction {
			Some(holding) => {
				let leg = self.build_source_leg(holding, cot, target.chain, request.user).await?;
				let expected = leg.expected_output();
				let required = needed + fees.total_for(expected);
				if expected < required {
					return Err(PlannerError::InsufficientBalance {
						required,
						available: expected,
					});
				}
				vec![leg]
			},
			None => {
				self.auto_select(request, cot, needed, &fees).await?
			},
		};

		Ok(self.assemble(request, cot, legs, needed, &fees, dest_leg, requote))
	}

	async fn plan_auto(&self, request: &PlanRequest, cot: Address) -> Result<RoutePlan, PlannerError> {
		let target = &request.target;
		let candidates: Vec<Holding> = match &request.source_restriction {
			Some(holding) => vec![holding.clone()],
			None => eligible_candidates(&request.snapshot, target.chain, cot),
		};
		if candidates.is_empty() {
			return Err(PlannerError::NoEligibleSource);
		}

		let mut legs = Vec::with_capacity(candidates.len());
		for holding in &candidates {
			legs.push(
				self.build_source_leg(holding, cot, target.chain, request.user)
					.await?,
			);
		}

		let fees = self
			.fees
			.fetch(target.chain, cot, self.cot_decimals(target.chain, &cot))
			.await?;

		let total: U256 = legs.iter().fold(U256::ZERO, |acc, l| acc + l.expected_output());
		let bridged: U256 = legs
			.iter()
			.filter(|l| l.feeds_bridge)
			.fold(U256::ZERO, |acc, l| acc + l.expected_output());
		let arriving = bridged.saturating_sub(fees.total_for(total));

		let intent_params = if bridged.is_zero() {
			None
		} else {
			Some(IntentParams {
				sources: per_chain_contributions(&legs, bridged),
				destination_chain: target.chain,
				destination_token: cot,
				destination_amount: arriving,
				recipient: request.recipient,
			})
		};

		// Whatever lands on the destination chain in COT is available to
		// the destination swap.
		let deliverable = snapshot_balance(&request.snapshot, target.chain, cot)
			+ (total - bridged)
			+ arriving;
		let (dest_leg, requote) = if target.token != cot && !deliverable.is_zero() {
			let quote = self
				.aggregator
				.quote_exact_input(target.chain, cot, target.token, deliverable, request.user)
				.await?;
			let family = self.registry.family(target.chain)?;
			let call = self.aggregator.build_call_data(&quote);
			let approval = family.build_approval(cot, call.to, deliverable).ok();
			let spec = RequoteSpec {
				chain: target.chain,
				cot,
				output_token: target.token,
				output_amount: quote.output_amount_min,
				buffer_bps: self.config.dest_buffer_bps,
			};
			(
				Some(DestinationLeg {
					call,
					approval,
					quote,
					buffered_input: deliverable,
				}),
				Some(spec),
			)
		} else {
			(None, None)
		};

		Ok(RoutePlan {
			target: target.clone(),
			source_legs: legs,
			intent_params,
			dest_leg,
			requote,
		})
	}

	/// Greedy auto selection: holdings already in COT first (no swap, no
	/// approval), then native holdings (no approval), then the rest,
	/// largest first within each group. Selection stops once aggregated
	/// quoted output covers the shortfall plus fees plus the margin.
	async fn auto_select(
		&self,
		request: &PlanRequest,
		cot: Address,
		needed: U256,
		fees: &FeeParams,
	) -> Result<Vec<SourceLeg>, PlannerError> {
		let candidates = eligible_candidates(&request.snapshot, request.target.chain, cot);
		let margin = needed * U256::from(self.config.selection_margin_bps)
			/ U256::from(BPS_DENOMINATOR);

		let mut legs: Vec<SourceLeg> = Vec::new();
		let mut accumulated = U256::ZERO;
		for holding in &candidates {
			let leg = self
				.build_source_leg(holding, cot, request.target.chain, request.user)
				.await?;
			accumulated += leg.expected_output();
			legs.push(leg);
			if accumulated >= needed + fees.total_for(accumulated) + margin {
				return Ok(legs);
			}
		}
		Err(PlannerError::NoEligibleSource)
	}

	/// Builds one source leg, quoting a swap into COT when the holding
	/// is any other token.
	async fn build_source_leg(
		&self,
		holding: &Holding,
		cot: Address,
		dest_chain: ChainId,
		user: Address,
	) -> Result<SourceLeg, PlannerError> {
		let feeds_bridge = holding.chain != dest_chain;
		if !holding.is_native && holding.token == cot {
			return Ok(SourceLeg {
				holding: holding.clone(),
				swap: None,
				feeds_bridge,
			});
		}

		let family = self.registry.family(holding.chain)?;
		if !family.supports_contract_calls() {
			return Err(PlannerError::UnsupportedOnChainFamily(holding.chain));
		}

		let quote = self
			.aggregator
			.quote_exact_input(holding.chain, holding.token, cot, holding.amount, user)
			.await?;
		let call = self.aggregator.build_call_data(&quote);
		let approval = if holding.is_native {
			None
		} else {
			family
				.build_approval(holding.token, call.to, holding.amount)
				.ok()
		};
		Ok(SourceLeg {
			holding: holding.clone(),
			swap: Some(SwapAction {
				call,
				approval,
				quote,
			}),
			feeds_bridge,
		})
	}

	#[allow(clippy::too_many_arguments)]
	fn assemble(
		&self,
		request: &PlanRequest,
		cot: Address,
		legs: Vec<SourceLeg>,
		needed: U256,
		fees: &FeeParams,
		dest_leg: Option<DestinationLeg>,
		requote: Option<RequoteSpec>,
	) -> RoutePlan {
		let target = &request.target;
		// COT produced by swaps already on the destination chain never
		// crosses a bridge; it offsets the movement amount directly.
		let local_produced: U256 = legs
			.iter()
			.filter(|l| !l.feeds_bridge)
			.fold(U256::ZERO, |acc, l| acc + l.expected_output());
		let bridge_amount = needed.saturating_sub(local_produced);

		let intent_params = if bridge_amount.is_zero() {
			None
		} else {
			let total: U256 = legs.iter().fold(U256::ZERO, |acc, l| acc + l.expected_output());
			let deposit_budget = bridge_amount + fees.total_for(total);
			Some(IntentParams {
				sources: per_chain_contributions(&legs, deposit_budget),
				destination_chain: target.chain,
				destination_token: cot,
				destination_amount: bridge_amount,
				recipient: request.recipient,
			})
		};

		// The destination leg and requote spec were derived before
		// source selection; carry them through unchanged.
		RoutePlan {
			target: target.clone(),
			source_legs: legs,
			intent_params,
			dest_leg,
			requote,
		}
	}
}

/// Sums snapshot balances for one (chain, token) pair.
fn snapshot_balance(snapshot: &[Holding], chain: ChainId, token: Address) -> U256 {
	snapshot
		.iter()
		.filter(|h| h.chain == chain && !h.is_native && h.token == token)
		.fold(U256::ZERO, |acc, h| acc + h.amount)
}

/// Candidate holdings for source selection, ordered: already-COT first,
/// then native, then the rest; largest first within each group. The
/// destination chain's COT balance is excluded — it offsets the
/// requirement instead of being a source.
fn eligible_candidates(snapshot: &[Holding], dest_chain: ChainId, cot: Address) -> Vec<Holding> {
	let mut candidates: Vec<Holding> = snapshot
		.iter()
		.filter(|h| !(h.chain == dest_chain && !h.is_native && h.token == cot))
		.filter(|h| !h.amount.is_zero())
		.cloned()
		.collect();
	let group = |h: &Holding| -> u8 {
		if !h.is_native && h.token == cot {
			0
		} else if h.is_native {
			1
		} else {
			2
		}
	};
	candidates.sort_by(|a, b| {
		group(a)
			.cmp(&group(b))
			.then(b.amount.cmp(&a.amount))
			.then(a.chain.cmp(&b.chain))
			.then(a.token.cmp(&b.token))
	});
	candidates
}

/// Splits a deposit budget over the legs feeding the bridge, per chain,
/// in leg order, capping the total at the budget.
fn per_chain_contributions(legs: &[SourceLeg], budget: U256) -> Vec<(ChainId, U256)> {
	let mut remaining = budget;
	let mut contributions: Vec<(ChainId, U256)> = Vec::new();
	for leg in legs.iter().filter(|l| l.feeds_bridge) {
		if remaining.is_zero() {
			break;
		}
		let amount = leg.expected_output().min(remaining);
		remaining -= amount;
		match contributions.iter_mut().find(|(c, _)| *c == leg.holding.chain) {
			Some((_, existing)) => *existing += amount,
			None => contributions.push((leg.holding.chain, amount)),
		}
	}
	contributions
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::aggregator::AggregatorError;
	use crate::fees::FeeError;
	use alloy_primitives::{address, Bytes};
	use async_trait::async_trait;
	use omniswap_registry::RegistryError;
	use omniswap_types::{CallSpec, ChainConfig, Quote, Universe};

	const CHAIN_A: ChainId = ChainId(1);
	const CHAIN_B: ChainId = ChainId(2);
	const CHAIN_C: ChainId = ChainId(3);

	fn usdc() -> Address {
		address!("00000000000000000000000000000000000000cc")
	}

	fn wbtc() -> Address {
		address!("00000000000000000000000000000000000000bb")
	}

	fn user() -> Address {
		address!("00000000000000000000000000000000000000ee")
	}

	fn registry() -> Arc<ChainRegistry> {
		let chain = |id: ChainId| ChainConfig {
			id,
			universe: Universe::Evm,
			native_decimals: 18,
			vault_address: address!("00000000000000000000000000000000000000aa"),
			cot_address: Some(usdc()),
			tokens: vec![omniswap_types::TokenInfo {
				address: usdc(),
				symbol: "USDC".into(),
				decimals: 6,
			}],
			rpc_urls: vec![],
		};
		Arc::new(ChainRegistry::new(vec![
			chain(CHAIN_A),
			chain(CHAIN_B),
			chain(CHAIN_C),
		]))
	}

	/// Deterministic aggregator: every sale converts 1:1 into the output
	/// token with a fixed 1% slippage bound, every exact-output quote
	/// asks for exactly the target amount as input.
	struct FixedAggregator;

	fn quote(
		chain: ChainId,
		input_token: Address,
		output_token: Address,
		input_amount: U256,
		output_amount_min: U256,
	) -> Quote {
		Quote {
			chain,
			input_token,
			output_token,
			input_amount,
			output_amount_min,
			expires_at: None,
			fetched_at: 1_000_000,
			call: CallSpec {
				to: address!("00000000000000000000000000000000000000f0"),
				data: Bytes::from(vec![0x01]),
				value: U256::ZERO,
			},
		}
	}

	#[async_trait]
	impl Aggregator for FixedAggregator {
		async fn quote_exact_input(
			&self,
			chain: ChainId,
			input_token: Address,
			output_token: Address,
			input_amount: U256,
			_user: Address,
		) -> Result<Quote, AggregatorError> {
			let min = input_amount * U256::from(99) / U256::from(100);
			Ok(quote(chain, input_token, output_token, input_amount, min))
		}

		async fn quote_exact_output(
			&self,
			chain: ChainId,
			input_token: Address,
			output_token: Address,
			target_output: U256,
			_user: Address,
		) -> Result<Quote, AggregatorError> {
			Ok(quote(chain, input_token, output_token, target_output, target_output))
		}
	}

	/// Aggregator whose call payload packs the quoted pair and input
	/// amount, so a planned call decodes back against its quote.
	struct EncodingAggregator;

	fn encoding_quote(
		chain: ChainId,
		input_token: Address,
		output_token: Address,
		input_amount: U256,
		output_amount_min: U256,
	) -> Quote {
		let mut data = Vec::with_capacity(72);
		data.extend_from_slice(input_token.as_slice());
		data.extend_from_slice(output_token.as_slice());
		data.extend_from_slice(&input_amount.to_be_bytes::<32>());
		Quote {
			chain,
			input_token,
			output_token,
			input_amount,
			output_amount_min,
			expires_at: None,
			fetched_at: 1_000_000,
			call: CallSpec {
				to: address!("00000000000000000000000000000000000000f0"),
				data: Bytes::from(data),
				value: U256::ZERO,
			},
		}
	}

	fn decode_swap_payload(data: &[u8]) -> (Address, Address, U256) {
		(
			Address::from_slice(&data[0..20]),
			Address::from_slice(&data[20..40]),
			U256::from_be_slice(&data[40..72]),
		)
	}

	#[async_trait]
	impl Aggregator for EncodingAggregator {
		async fn quote_exact_input(
			&self,
			chain: ChainId,
			input_token: Address,
			output_token: Address,
			input_amount: U256,
			_user: Address,
		) -> Result<Quote, AggregatorError> {
			let min = input_amount * U256::from(99) / U256::from(100);
			Ok(encoding_quote(chain, input_token, output_token, input_amount, min))
		}

		async fn quote_exact_output(
			&self,
			chain: ChainId,
			input_token: Address,
			output_token: Address,
			target_output: U256,
			_user: Address,
		) -> Result<Quote, AggregatorError> {
			Ok(encoding_quote(chain, input_token, output_token, target_output, target_output))
		}
	}

	struct FlatFees;

	#[async_trait]
	impl FeeSchedule for FlatFees {
		async fn fetch(
			&self,
			_destination_chain: ChainId,
			_destination_token: Address,
			_decimals: u8,
		) -> Result<FeeParams, FeeError> {
			Ok(FeeParams {
				solver_fee: U256::from(1),
				protocol_fee_bps: 0,
			})
		}
	}

	fn planner() -> RoutePlanner {
		RoutePlanner::new(
			registry(),
			Arc::new(FixedAggregator),
			Arc::new(FlatFees),
			PlannerConfig::default(),
		)
	}

	fn holding(chain: ChainId, token: Address, amount: u64, is_native: bool) -> Holding {
		Holding {
			chain,
			token,
			amount: U256::from(amount),
			is_native,
		}
	}

	fn request(target_amount: Option<u64>, snapshot: Vec<Holding>) -> PlanRequest {
		PlanRequest {
			target: Target {
				chain: CHAIN_C,
				token: usdc(),
				amount: target_amount.map(U256::from),
			},
			snapshot,
			source_restriction: None,
			user: user(),
			recipient: user(),
		}
	}

	#[tokio::test]
	async fn skip_bridge_when_destination_balance_covers() {
		let plan = planner()
			.plan(&request(
				Some(300),
				vec![holding(CHAIN_C, usdc(), 400, false)],
			))
			.await
			.unwrap();
		assert!(plan.intent_params.is_none());
		assert!(plan.source_legs.is_empty());
		assert!(plan.dest_leg.is_none());
	}

	#[tokio::test]
	async fn scenario_prefers_cot_holding_over_native() {
		// Source holdings: 500 USDC on A, 0.2 native on B; destination C
		// wants 300 USDC and already holds 50.
		let plan = planner()
			.plan(&request(
				Some(300),
				vec![
					holding(CHAIN_A, usdc(), 500, false),
					holding(CHAIN_B, Address::ZERO, 200_000_000, true),
					holding(CHAIN_C, usdc(), 50, false),
				],
			))
			.await
			.unwrap();

		// Chain A alone suffices: no swap, no approval, no native spend.
		assert_eq!(plan.source_legs.len(), 1);
		assert_eq!(plan.source_legs[0].holding.chain, CHAIN_A);
		assert!(plan.source_legs[0].swap.is_none());

		let intent = plan.intent_params.unwrap();
		assert_eq!(intent.destination_amount, U256::from(250));
		// Deposits cover the movement plus the flat solver fee.
		assert_eq!(intent.total_deposit(), U256::from(251));
		assert_eq!(intent.sources, vec![(CHAIN_A, U256::from(251))]);

		// Output token is the COT itself: no destination swap.
		assert!(plan.dest_leg.is_none());
	}

	#[tokio::test]
	async fn movement_amount_offsets_local_swap_output() {
		// A non-COT holding on the destination chain is swapped locally;
		// its quoted output offsets the bridged amount.
		let plan = planner()
			.plan(&request(
				Some(300),
				vec![
					holding(CHAIN_C, wbtc(), 200, false),
					holding(CHAIN_A, usdc(), 150, false),
				],
			))
			.await
			.unwrap();

		assert!(plan.source_legs.iter().any(|l| !l.feeds_bridge));
		let local_produced: U256 = plan
			.source_legs
			.iter()
			.filter(|l| !l.feeds_bridge)
			.map(|l| l.expected_output())
			.fold(U256::ZERO, |a, b| a + b);
		let intent = plan.intent_params.unwrap();
		assert_eq!(
			intent.destination_amount,
			U256::from(300).saturating_sub(local_produced)
		);
	}

	#[tokio::test]
	async fn destination_swap_input_carries_planning_buffer() {
		let plan = planner()
			.plan(&PlanRequest {
				target: Target {
					chain: CHAIN_C,
					token: wbtc(),
					amount: Some(U256::from(10_000)),
				},
				snapshot: vec![holding(CHAIN_A, usdc(), 50_000, false)],
				source_restriction: None,
				user: user(),
				recipient: user(),
			})
			.await
			.unwrap();

		let dest = plan.dest_leg.unwrap();
		// 2% buffer over the 1:1 exact-output quote.
		assert_eq!(dest.buffered_input, U256::from(10_200));
		assert!(dest.approval.is_some());
		let requote = plan.requote.unwrap();
		assert_eq!(requote.output_amount, U256::from(10_000));
		assert_eq!(requote.buffer_bps, 200);
	}

	#[tokio::test]
	async fn planning_is_idempotent() {
		let req = request(
			Some(300),
			vec![
				holding(CHAIN_A, usdc(), 500, false),
				holding(CHAIN_B, Address::ZERO, 400, true),
				holding(CHAIN_C, usdc(), 50, false),
			],
		);
		let p = planner();
		let first = p.plan(&req).await.unwrap();
		let second = p.plan(&req).await.unwrap();
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn single_source_below_requirement_fails() {
		let mut req = request(Some(300), vec![holding(CHAIN_A, usdc(), 100, false)]);
		req.source_restriction = Some(holding(CHAIN_A, usdc(), 100, false));
		let err = planner().plan(&req).await.unwrap_err();
		assert!(matches!(err, PlannerError::InsufficientBalance { .. }));
	}

	#[tokio::test]
	async fn unknown_destination_chain_fails_fast() {
		let mut req = request(Some(300), vec![]);
		req.target.chain = ChainId(99);
		let err = planner().plan(&req).await.unwrap_err();
		assert!(matches!(
			err,
			PlannerError::Registry(RegistryError::ChainDataNotFound(ChainId(99)))
		));
	}

	#[tokio::test]
	async fn auto_selection_exhaustion_is_no_eligible_source() {
		let err = planner()
			.plan(&request(Some(300), vec![holding(CHAIN_A, usdc(), 10, false)]))
			.await
			.unwrap_err();
		assert!(matches!(err, PlannerError::NoEligibleSource));
	}

	#[tokio::test]
	async fn auto_mode_liquidates_and_nets_fees() {
		let plan = planner()
			.plan(&request(
				None,
				vec![
					holding(CHAIN_A, usdc(), 500, false),
					holding(CHAIN_B, usdc(), 300, false),
				],
			))
			.await
			.unwrap();
		assert_eq!(plan.source_legs.len(), 2);
		let intent = plan.intent_params.unwrap();
		// 800 bridged minus the flat solver fee.
		assert_eq!(intent.destination_amount, U256::from(799));
	}

	#[tokio::test]
	async fn planned_call_data_decodes_back_to_its_quote() {
		let planner = RoutePlanner::new(
			registry(),
			Arc::new(EncodingAggregator),
			Arc::new(FlatFees),
			PlannerConfig::default(),
		);
		let plan = planner
			.plan(&PlanRequest {
				target: Target {
					chain: CHAIN_C,
					token: wbtc(),
					amount: Some(U256::from(100)),
				},
				snapshot: vec![holding(CHAIN_A, wbtc(), 500, false)],
				source_restriction: None,
				user: user(),
				recipient: user(),
			})
			.await
			.unwrap();

		// The source swap call carries exactly the pair and amount its
		// quote priced.
		let swap = plan.source_legs[0].swap.as_ref().unwrap();
		let (input, output, amount) = decode_swap_payload(&swap.call.data);
		assert_eq!(input, swap.quote.input_token);
		assert_eq!(output, swap.quote.output_token);
		assert_eq!(amount, swap.quote.input_amount);

		// Same binding on the destination leg.
		let dest = plan.dest_leg.as_ref().unwrap();
		let (input, output, amount) = decode_swap_payload(&dest.call.data);
		assert_eq!(input, dest.quote.input_token);
		assert_eq!(output, dest.quote.output_token);
		assert_eq!(amount, dest.quote.input_amount);
	}
}

//! The three-phase execution engine.
//!
//! A plan executes in a fixed phase order:
//!
//! 1. **Source swaps** — per chain, one atomic batch holding any
//!    approvals, the swap, and (for chains feeding the cross-chain
//!    movement) the deposit sweep to the relay intermediary. Chains run
//!    concurrently, each chain strictly serialized. A failed chain gets
//!    one slippage-checked retry when its quotes had gone stale;
//!    otherwise residual funds on the chains that did succeed are swept
//!    back to the user and the whole execution fails.
//! 2. **Fund movement** — the intent is recorded with the amounts that
//!    actually settled, then fulfillment is awaited. Skip-bridge plans
//!    resolve immediately.
//! 3. **Destination swap** — the optional swap out of the common token,
//!    re-derived first when its quote aged out, then the mandatory
//!    final sweep of whatever resulted to the user.

use crate::event_bus::EventBus;
use crate::metadata::{sign_and_persist, MetadataStore};
use crate::settlement::{wait_for_settlement, SettlementConfig};
use crate::OrchestratorError;
use alloy_primitives::{Address, B256, U256};
use futures::future::join_all;
use omniswap_cache::{AllowanceKey, CodeKey, SessionCache};
use omniswap_intent::IntentProtocol;
use omniswap_planner::fees::BPS_DENOMINATOR;
use omniswap_planner::{Aggregator, RoutePlanner};
use omniswap_registry::ChainRegistry;
use omniswap_signing::{submit_direct, BatchSigner, BatchSubmitter, SigningError};
use omniswap_types::{
	truncate_id, CallSpec, ChainClient, ChainId, ClientMap, DestinationLeg, FundMovementIntent,
	IntentParams, LegSummary, RoutePlan, SourceLeg, SwapAction, SwapEvent, SwapMetadata,
};
use std::sync::Arc;

/// Engine tuning.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
	pub settlement: SettlementConfig,
	/// Maximum tolerated drop of the total quoted minimum output during
	/// a source re-quote, in basis points.
	pub max_slippage_bps: u64,
}

impl Default for OrchestratorConfig {
	fn default() -> Self {
		Self {
			settlement: SettlementConfig::default(),
			max_slippage_bps: 100,
		}
	}
}

/// What one completed execution produced.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
	pub source_legs: Vec<LegSummary>,
	pub destination_leg: Option<LegSummary>,
	/// All-zero for skip-bridge executions.
	pub intent_id: B256,
}

/// Everything that settled on one source chain.
struct ChainOutcome {
	chain: ChainId,
	summaries: Vec<LegSummary>,
	/// COT actually deposited to the relay intermediary on this chain.
	deposited: U256,
	/// Quoted minimum COT output of this chain's legs.
	min_output: U256,
}

/// A source chain that did not settle.
struct ChainFailure {
	chain: ChainId,
	/// Whether any of the chain's quotes had aged out when it failed,
	/// which is what makes a slippage-checked retry eligible.
	stale: bool,
	error: OrchestratorError,
}

/// Drives one plan through the three phases.
pub struct Orchestrator {
	registry: Arc<ChainRegistry>,
	clients: ClientMap,
	planner: Arc<RoutePlanner>,
	aggregator: Arc<dyn Aggregator>,
	signer: Arc<BatchSigner>,
	relay: Arc<dyn BatchSubmitter>,
	intents: Arc<IntentProtocol>,
	metadata: Arc<dyn MetadataStore>,
	events: EventBus,
	/// The user's primary account, the recipient of all sweeps.
	user: Address,
	config: OrchestratorConfig,
}

impl Orchestrator {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		registry: Arc<ChainRegistry>,
		clients: ClientMap,
		planner: Arc<RoutePlanner>,
		aggregator: Arc<dyn Aggregator>,
		signer: Arc<BatchSigner>,
		relay: Arc<dyn BatchSubmitter>,
		intents: Arc<IntentProtocol>,
		metadata: Arc<dyn MetadataStore>,
		user: Address,
		config: OrchestratorConfig,
	) -> Self {
		Self {
			registry,
			clients,
			planner,
			aggregator,
			signer,
			relay,
			intents,
			metadata,
			events: EventBus::default(),
			user,
			config,
		}
	}

	/// Progress event subscription for this engine.
	pub fn events(&self) -> &EventBus {
		&self.events
	}

	/// Executes a plan end to end.
	pub async fn execute(&self, plan: &RoutePlan) -> Result<ExecutionReport, OrchestratorError> {
		let mut cache = SessionCache::new();
		self.register_state_queries(plan, &mut cache);
		cache.process(&self.clients).await?;

		let (source_legs, realized) = self.run_source_phase(plan, &cache).await?;

		let intent = self.run_fund_movement_phase(plan, &realized).await?;

		let destination_leg = self.run_destination_phase(plan, &cache).await?;

		let report = ExecutionReport {
			source_legs,
			destination_leg,
			intent_id: intent.intent_id,
		};
		sign_and_persist(
			self.metadata.as_ref(),
			self.signer.signer(),
			SwapMetadata {
				source_legs: report.source_legs.clone(),
				destination_leg: report.destination_leg.clone(),
				intent_id: report.intent_id,
				signature: Default::default(),
			},
		)
		.await;

		self.events.publish(SwapEvent::Completed);
		tracing::info!(
			intent_id = %truncate_id(&report.intent_id.to_string()),
			"plan execution completed"
		);
		Ok(report)
	}

	/// Registers every allowance and delegated-code fact the execution
	/// will need, so the cache's single read pass covers all of it.
	fn register_state_queries(&self, plan: &RoutePlan, cache: &mut SessionCache) {
		let ephemeral = self.signer.address();
		for chain in plan.source_chains() {
			cache.add_set_code_query(CodeKey {
				chain,
				address: ephemeral,
			});
		}
		cache.add_set_code_query(CodeKey {
			chain: plan.target.chain,
			address: ephemeral,
		});

		for leg in &plan.source_legs {
			if let Some(swap) = &leg.swap {
				cache.add_allowance_query(
					AllowanceKey {
						chain: leg.holding.chain,
						token: leg.holding.token,
						owner: ephemeral,
						spender: swap.call.to,
					},
					leg.holding.is_native,
				);
			}
		}
		if let (Some(dest), Some(spec)) = (&plan.dest_leg, &plan.requote) {
			cache.add_allowance_query(
				AllowanceKey {
					chain: spec.chain,
					token: spec.cot,
					owner: ephemeral,
					spender: dest.call.to,
				},
				false,
			);
		}
	}

	// ---- phase 1: source swaps ----

	async fn run_source_phase(
		&self,
		plan: &RoutePlan,
		cache: &SessionCache,
	) -> Result<(Vec<LegSummary>, Vec<(ChainId, U256)>), OrchestratorError> {
		let groups = group_legs(plan);
		if groups.is_empty() {
			return Ok((Vec::new(), Vec::new()));
		}

		let results = join_all(
			groups
				.iter()
				.map(|(chain, legs)| self.run_source_chain(*chain, legs, plan, cache)),
		)
		.await;

		let mut settled: Vec<ChainOutcome> = Vec::new();
		let mut failures: Vec<ChainFailure> = Vec::new();
		for result in results {
			match result {
				Ok(outcome) => settled.push(outcome),
				Err(failure) => failures.push(failure),
			}
		}

		if !failures.is_empty() {
			if let Some(retry_groups) = self
				.slippage_checked_requote(plan, &settled, &failures)
				.await
			{
				let retry_results = join_all(
					retry_groups
						.iter()
						.map(|(chain, legs)| self.run_source_chain(*chain, legs, plan, cache)),
				)
				.await;
				failures.clear();
				for result in retry_results {
					match result {
						Ok(outcome) => settled.push(outcome),
						Err(failure) => failures.push(failure),
					}
				}
			}
		}

		if !failures.is_empty() {
			for failure in &failures {
				tracing::error!(chain = %failure.chain, error = %failure.error, "source chain failed");
			}
			let swept = self.sweep_back(&settled).await;
			return Err(OrchestratorError::SourceSwapFailed {
				failed: failures.iter().map(|f| f.chain).collect(),
				swept,
			});
		}

		let mut summaries = Vec::new();
		let mut realized = Vec::new();
		for outcome in settled {
			summaries.extend(outcome.summaries);
			if outcome.deposited > U256::ZERO {
				realized.push((outcome.chain, outcome.deposited));
			}
		}
		Ok((summaries, realized))
	}

	async fn run_source_chain(
		&self,
		chain: ChainId,
		legs: &[SourceLeg],
		plan: &RoutePlan,
		cache: &SessionCache,
	) -> Result<ChainOutcome, ChainFailure> {
		let stale = legs
			.iter()
			.any(|l| l.swap.as_ref().is_some_and(|s| s.quote.is_stale_now()));
		self.execute_source_chain(chain, legs, plan, cache)
			.await
			.map_err(|error| ChainFailure {
				chain,
				stale,
				error,
			})
	}

	async fn execute_source_chain(
		&self,
		chain: ChainId,
		legs: &[SourceLeg],
		plan: &RoutePlan,
		cache: &SessionCache,
	) -> Result<ChainOutcome, OrchestratorError> {
		let client = self.client(chain)?;
		let family = self.registry.family(chain)?;
		let cot = self.registry.cot_required(chain)?;
		let ephemeral = self.signer.address();

		let mut calls: Vec<CallSpec> = Vec::new();
		for leg in legs {
			if let Some(swap) = &leg.swap {
				if let Some(approval) = &swap.approval {
					let key = AllowanceKey {
						chain,
						token: leg.holding.token,
						owner: ephemeral,
						spender: swap.call.to,
					};
					// An unregistered spender (possible after a
					// re-quote changed the router) just keeps the
					// approval in the batch.
					let allowance = cache.allowance(&key).unwrap_or_default();
					if allowance < leg.holding.amount {
						calls.push(approval.clone());
					}
				}
				calls.push(swap.call.clone());
			}
		}

		// Only chains feeding the cross-chain movement deposit into the
		// relay intermediary, and only for the planned contribution.
		let deposit = plan
			.intent_params
			.as_ref()
			.filter(|_| legs.iter().any(|l| l.feeds_bridge))
			.and_then(|p| p.sources.iter().find(|(c, _)| *c == chain))
			.map(|(_, amount)| *amount)
			.unwrap_or(U256::ZERO);
		if deposit > U256::ZERO {
			let vault = self.registry.vault(chain)?;
			calls.push(family.build_transfer(Some(cot), vault, deposit)?);
		}

		let min_output = legs
			.iter()
			.fold(U256::ZERO, |acc, leg| acc + leg.expected_output());

		if calls.is_empty() {
			// Nothing to do on-chain: a local COT holding feeding the
			// destination phase directly.
			return Ok(ChainOutcome {
				chain,
				summaries: Vec::new(),
				deposited: U256::ZERO,
				min_output,
			});
		}

		let hashes = self.submit_calls(chain, &client, calls, cache).await?;
		for hash in &hashes {
			wait_for_settlement(&client, *hash, &self.config.settlement).await?;
			self.events.publish(SwapEvent::SourceChainConfirmed {
				chain,
				tx_hash: *hash,
			});
		}

		let tx_hash = *hashes
			.last()
			.ok_or_else(|| OrchestratorError::InvalidPlan("no transactions submitted".into()))?;
		let summaries = legs
			.iter()
			.map(|leg| LegSummary {
				chain,
				input_token: leg.holding.token,
				input_amount: leg.holding.amount,
				tx_hash,
			})
			.collect();
		Ok(ChainOutcome {
			chain,
			summaries,
			deposited: deposit,
			min_output,
		})
	}

	/// Submits one chain's call list, choosing the path by value
	/// content: calls attaching native value go out through the user's
	/// wallet one by one, everything else as a single signed batch.
	async fn submit_calls(
		&self,
		chain: ChainId,
		client: &Arc<dyn ChainClient>,
		calls: Vec<CallSpec>,
		cache: &SessionCache,
	) -> Result<Vec<B256>, OrchestratorError> {
		if calls.iter().any(|c| c.has_value()) {
			self.events
				.publish(SwapEvent::BatchSubmissionStarted { chain });
			let hashes = submit_direct(client, &calls).await.map_err(|(sent, e)| {
				tracing::warn!(chain = %chain, sent = sent.len(), "direct submission failed midway");
				e
			})?;
			for hash in &hashes {
				self.events.publish(SwapEvent::BatchSubmissionDone {
					chain,
					tx_hash: *hash,
				});
			}
			return Ok(hashes);
		}

		self.events
			.publish(SwapEvent::PermitSigningStarted { chain });
		let needs_delegation = !cache
			.has_delegated_code(&CodeKey {
				chain,
				address: self.signer.address(),
			})
			.unwrap_or(false);
		let signed = self
			.signer
			.sign_batch(chain, calls.into_iter().map(Into::into).collect(), needs_delegation)
			.await?;
		self.events.publish(SwapEvent::PermitSigningDone { chain });

		self.events
			.publish(SwapEvent::BatchSubmissionStarted { chain });
		let outcome = self
			.relay
			.submit_batches(std::slice::from_ref(&signed))
			.await
			.pop()
			.unwrap_or(Err(SigningError::Wire("relay returned no outcome".into())));
		let hash = outcome?;
		self.events.publish(SwapEvent::BatchSubmissionDone {
			chain,
			tx_hash: hash,
		});
		Ok(vec![hash])
	}

	/// Re-quotes the failed chains when every one of them had stale
	/// quotes, and accepts the retry only when the combined minimum
	/// output stays within the slippage bound of the original plan.
	async fn slippage_checked_requote(
		&self,
		plan: &RoutePlan,
		settled: &[ChainOutcome],
		failures: &[ChainFailure],
	) -> Option<Vec<(ChainId, Vec<SourceLeg>)>> {
		if !failures.iter().all(|f| f.stale) {
			tracing::info!("slippage retry ineligible: failed chain had fresh quotes");
			return None;
		}

		let ephemeral = self.signer.address();
		let mut retry_groups = Vec::with_capacity(failures.len());
		let mut requoted_min = U256::ZERO;
		for failure in failures {
			let chain = failure.chain;
			let legs: Vec<SourceLeg> = plan
				.source_legs
				.iter()
				.filter(|l| l.holding.chain == chain)
				.cloned()
				.collect();
			match self.requote_legs(chain, legs, ephemeral).await {
				Ok((rebuilt, min)) => {
					requoted_min += min;
					retry_groups.push((chain, rebuilt));
				},
				Err(e) => {
					tracing::warn!(chain = %chain, error = %e, "re-quote failed, giving up on retry");
					return None;
				},
			}
		}

		let settled_min = settled
			.iter()
			.fold(U256::ZERO, |acc, o| acc + o.min_output);
		let old_total = plan.total_expected_output();
		let floor = old_total * U256::from(BPS_DENOMINATOR - self.config.max_slippage_bps)
			/ U256::from(BPS_DENOMINATOR);
		let new_total = settled_min + requoted_min;
		if new_total < floor {
			tracing::warn!(%new_total, %old_total, %floor, "re-quoted output breaches slippage bound");
			return None;
		}
		tracing::info!(%new_total, %old_total, "slippage retry accepted");
		Some(retry_groups)
	}

	async fn requote_legs(
		&self,
		chain: ChainId,
		legs: Vec<SourceLeg>,
		ephemeral: Address,
	) -> Result<(Vec<SourceLeg>, U256), OrchestratorError> {
		let cot = self.registry.cot_required(chain)?;
		let family = self.registry.family(chain)?;
		let mut rebuilt = Vec::with_capacity(legs.len());
		let mut min_total = U256::ZERO;
		for leg in legs {
			match leg.swap {
				Some(_) => {
					let quote = self
						.aggregator
						.quote_exact_input(chain, leg.holding.token, cot, leg.holding.amount, ephemeral)
						.await?;
					min_total += quote.output_amount_min;
					let approval = if leg.holding.is_native {
						None
					} else {
						Some(family.build_approval(
							leg.holding.token,
							quote.call.to,
							leg.holding.amount,
						)?)
					};
					rebuilt.push(SourceLeg {
						swap: Some(SwapAction {
							call: quote.call.clone(),
							approval,
							quote,
						}),
						..leg
					});
				},
				None => {
					min_total += leg.holding.amount;
					rebuilt.push(leg);
				},
			}
		}
		Ok((rebuilt, min_total))
	}

	/// Best-effort sweeps returning residual COT on the chains that DID
	/// settle back to the user. Failed chains are left alone: nothing
	/// moved there.
	async fn sweep_back(&self, settled: &[ChainOutcome]) -> Vec<ChainId> {
		let mut swept = Vec::new();
		for outcome in settled {
			if self.sweep_chain_residual(outcome.chain).await.is_some() {
				swept.push(outcome.chain);
			}
		}
		swept
	}

	async fn sweep_chain_residual(&self, chain: ChainId) -> Option<B256> {
		let client = self.clients.get(&chain)?.clone();
		let cot = self.registry.cot_required(chain).ok()?;
		let family = self.registry.family(chain).ok()?;
		let balance = match client.get_balance(self.signer.address(), Some(cot)).await {
			Ok(balance) => balance,
			Err(e) => {
				tracing::warn!(chain = %chain, error = %e, "sweep balance read failed");
				return None;
			},
		};
		if balance.is_zero() {
			return None;
		}
		let call = family.build_sweep(Some(cot), self.user, balance).ok()?;
		// Delegation was established during the source phase.
		let signed = self
			.signer
			.sign_batch(chain, vec![call.into()], false)
			.await
			.ok()?;
		match self
			.relay
			.submit_batches(std::slice::from_ref(&signed))
			.await
			.pop()?
		{
			Ok(tx_hash) => {
				tracing::info!(chain = %chain, %tx_hash, %balance, "residual swept back to user");
				self.events
					.publish(SwapEvent::SweepPerformed { chain, tx_hash });
				Some(tx_hash)
			},
			Err(e) => {
				tracing::warn!(chain = %chain, error = %e, "sweep submission failed");
				None
			},
		}
	}

	// ---- phase 2: fund movement ----

	async fn run_fund_movement_phase(
		&self,
		plan: &RoutePlan,
		realized: &[(ChainId, U256)],
	) -> Result<FundMovementIntent, OrchestratorError> {
		let Some(params) = plan.intent_params.clone() else {
			tracing::debug!("skip-bridge plan, no fund movement required");
			return Ok(IntentProtocol::skip_bridge(IntentParams {
				sources: Vec::new(),
				destination_chain: plan.target.chain,
				destination_token: plan.target.token,
				destination_amount: U256::ZERO,
				recipient: self.user,
			}));
		};

		let mut intent = self.intents.record(params, realized).await?;
		self.events.publish(SwapEvent::IntentRecorded {
			intent_id: intent.intent_id,
		});
		self.intents.wait_for_fill(&mut intent).await?;
		self.events.publish(SwapEvent::IntentFilled {
			intent_id: intent.intent_id,
		});
		Ok(intent)
	}

	// ---- phase 3: destination swap and final sweep ----

	async fn run_destination_phase(
		&self,
		plan: &RoutePlan,
		cache: &SessionCache,
	) -> Result<Option<LegSummary>, OrchestratorError> {
		let chain = plan.target.chain;
		let client = self.client(chain)?;
		let family = self.registry.family(chain)?;
		let ephemeral = self.signer.address();

		let mut swap_summary = None;
		if let Some(planned) = &plan.dest_leg {
			let leg = self.refresh_destination_leg(plan, planned).await?;

			let mut calls = Vec::new();
			if let Some(approval) = &leg.approval {
				let key = AllowanceKey {
					chain,
					token: leg.quote.input_token,
					owner: ephemeral,
					spender: leg.call.to,
				};
				if cache.allowance(&key).unwrap_or_default() < leg.quote.input_amount {
					calls.push(approval.clone());
				}
			}
			calls.push(leg.call.clone());

			let hashes = self.submit_calls(chain, &client, calls, cache).await?;
			for hash in &hashes {
				wait_for_settlement(&client, *hash, &self.config.settlement).await?;
			}
			swap_summary = hashes.last().map(|hash| LegSummary {
				chain,
				input_token: leg.quote.input_token,
				input_amount: leg.quote.input_amount,
				tx_hash: *hash,
			});
		}

		// Mandatory final sweep: whatever resulted goes to the user,
		// along with any intermediate-token input the swap left behind
		// (the planning buffer, or a cheaper re-quote).
		let token = (plan.target.token != Address::ZERO).then_some(plan.target.token);
		let balance = client.get_balance(ephemeral, token).await?;
		let mut sweeps = Vec::new();
		if !balance.is_zero() {
			sweeps.push(family.build_sweep(token, self.user, balance)?);
		}
		let cot = self.registry.cot_required(chain)?;
		if plan.target.token != cot {
			let residual = client.get_balance(ephemeral, Some(cot)).await?;
			if !residual.is_zero() {
				tracing::info!(chain = %chain, %residual, "returning unconsumed intermediate-token balance");
				sweeps.push(family.build_sweep(Some(cot), self.user, residual)?);
			}
		}
		if sweeps.is_empty() {
			tracing::debug!(chain = %chain, "nothing to sweep on the destination chain");
			return Ok(swap_summary);
		}
		let hashes = self.submit_calls(chain, &client, sweeps, cache).await?;
		for hash in &hashes {
			wait_for_settlement(&client, *hash, &self.config.settlement).await?;
			self.events.publish(SwapEvent::DestinationConfirmed {
				chain,
				tx_hash: *hash,
			});
		}

		Ok(swap_summary.or_else(|| {
			hashes.last().map(|hash| LegSummary {
				chain,
				input_token: plan.target.token,
				input_amount: balance,
				tx_hash: *hash,
			})
		}))
	}

	/// Re-derives the destination leg when its quote aged out.
	///
	/// The execution spend bound never grows: when the fresh quote needs
	/// more input than the planning-time buffer allows, the phase fails
	/// rather than overspend.
	async fn refresh_destination_leg(
		&self,
		plan: &RoutePlan,
		planned: &DestinationLeg,
	) -> Result<DestinationLeg, OrchestratorError> {
		if !planned.quote.is_stale_now() {
			return Ok(planned.clone());
		}
		let spec = plan
			.requote
			.as_ref()
			.ok_or_else(|| OrchestratorError::InvalidPlan("stale destination leg without requote inputs".into()))?;
		tracing::info!(chain = %spec.chain, "destination quote stale, re-deriving");
		let fresh = self
			.planner
			.requote_destination(spec, self.signer.address())
			.await?;
		if fresh.quote.input_amount > planned.buffered_input {
			return Err(OrchestratorError::QuoteStale {
				required: fresh.quote.input_amount,
				buffered: planned.buffered_input,
			});
		}
		Ok(DestinationLeg {
			// The original buffer stays the spend bound.
			buffered_input: planned.buffered_input,
			..fresh
		})
	}

	fn client(&self, chain: ChainId) -> Result<Arc<dyn ChainClient>, OrchestratorError> {
		self.clients
			.get(&chain)
			.cloned()
			.ok_or(OrchestratorError::MissingClient(chain))
	}
}

/// Groups a plan's legs per chain, preserving the plan's native-first
/// chain order.
fn group_legs(plan: &RoutePlan) -> Vec<(ChainId, Vec<SourceLeg>)> {
	plan.source_chains()
		.into_iter()
		.map(|chain| {
			let legs = plan
				.source_legs
				.iter()
				.filter(|l| l.holding.chain == chain)
				.cloned()
				.collect();
			(chain, legs)
		})
		.collect()
}

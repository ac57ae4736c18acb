//! Cross-chain fund-movement intent protocol.
//!
//! Per intent the state machine is: created → deposits submitted per
//! source chain (as sweep calls inside the source-phase batches) →
//! recorded on the coordination ledger → unfilled → filled. Recording
//! happens only after source swaps settle, so the intent always carries
//! realized amounts rather than stale quotes.
//!
//! The double-check submission fired after recording is a fraud
//! detection safety net, not a fill signal: it is retried a small fixed
//! number of times regardless of fill state, and its failure is logged
//! and swallowed.

use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use omniswap_types::{truncate_id, ChainId, FundMovementIntent, IntentParams, IntentStatus};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the intent protocol.
#[derive(Debug, Error)]
pub enum IntentError {
	/// The coordination ledger rejected or failed a request.
	#[error("ledger error: {0}")]
	Ledger(String),
	/// The ledger never confirmed fulfillment within the timeout.
	#[error("intent {intent_id} unfilled after {waited:?}")]
	FillTimeout { intent_id: B256, waited: Duration },
}

/// Errors surfaced by the external ledger client.
#[derive(Debug, Error)]
pub enum LedgerError {
	#[error("ledger unavailable: {0}")]
	Unavailable(String),
	#[error("intent rejected: {0}")]
	Rejected(String),
}

/// The external coordination ledger boundary.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait LedgerClient: Send + Sync {
	/// Records a fund-movement intent, returning its ledger-assigned id.
	async fn record_intent(&self, params: &IntentParams) -> Result<B256, LedgerError>;

	/// Resolves once the ledger confirms a matching deposit and release.
	async fn await_fill(&self, intent_id: B256) -> Result<(), LedgerError>;

	/// Issues the safety double-check submission for an intent.
	async fn double_check(&self, intent_id: B256) -> Result<(), LedgerError>;
}

/// Protocol tuning.
#[derive(Debug, Clone, Copy)]
pub struct IntentConfig {
	/// How long to wait for fulfillment before declaring the intent
	/// unfillable.
	pub fill_timeout: Duration,
	/// Fixed retry budget for the double-check submission.
	pub double_check_attempts: u32,
	/// Fixed backoff between double-check attempts.
	pub double_check_backoff: Duration,
}

impl Default for IntentConfig {
	fn default() -> Self {
		Self {
			fill_timeout: Duration::from_secs(600),
			double_check_attempts: 3,
			double_check_backoff: Duration::from_secs(2),
		}
	}
}

/// Records intents and awaits their fulfillment.
pub struct IntentProtocol {
	ledger: Arc<dyn LedgerClient>,
	config: IntentConfig,
}

impl IntentProtocol {
	pub fn new(ledger: Arc<dyn LedgerClient>, config: IntentConfig) -> Self {
		Self { ledger, config }
	}

	/// The skip-bridge placeholder: no movement was required, the wait
	/// resolves immediately.
	pub fn skip_bridge(params: IntentParams) -> FundMovementIntent {
		FundMovementIntent {
			params,
			intent_id: B256::ZERO,
			status: IntentStatus::Filled,
		}
	}

	/// Records an intent with realized source outputs folded in, then
	/// fires the double-check task in the background.
	pub async fn record(
		&self,
		params: IntentParams,
		realized: &[(ChainId, U256)],
	) -> Result<FundMovementIntent, IntentError> {
		let params = params.with_realized_sources(realized);
		let intent_id = self
			.ledger
			.record_intent(&params)
			.await
			.map_err(|e| IntentError::Ledger(e.to_string()))?;
		tracing::info!(
			intent_id = %truncate_id(&intent_id.to_string()),
			deposit = %params.total_deposit(),
			"fund-movement intent recorded"
		);

		let ledger = self.ledger.clone();
		let attempts = self.config.double_check_attempts;
		let backoff = self.config.double_check_backoff;
		tokio::spawn(async move {
			run_double_check(ledger, intent_id, attempts, backoff).await;
		});

		Ok(FundMovementIntent {
			params,
			intent_id,
			status: IntentStatus::Unfilled,
		})
	}

	/// Awaits fulfillment, marking the intent filled on success.
	///
	/// Skip-bridge intents resolve immediately. Real intents fail with
	/// [`IntentError::FillTimeout`] once the configured timeout expires.
	pub async fn wait_for_fill(
		&self,
		intent: &mut FundMovementIntent,
	) -> Result<(), IntentError> {
		if intent.is_skip_bridge() {
			intent.status = IntentStatus::Filled;
			return Ok(());
		}

		match tokio::time::timeout(
			self.config.fill_timeout,
			self.ledger.await_fill(intent.intent_id),
		)
		.await
		{
			Ok(Ok(())) => {
				intent.status = IntentStatus::Filled;
				tracing::info!(intent_id = %intent.intent_id, "intent filled");
				Ok(())
			},
			Ok(Err(e)) => Err(IntentError::Ledger(e.to_string())),
			Err(_) => Err(IntentError::FillTimeout {
				intent_id: intent.intent_id,
				waited: self.config.fill_timeout,
			}),
		}
	}
}

/// Runs the double-check with its fixed retry budget.
///
/// Exhaustion is logged and swallowed: this is an assertion against
/// ledger-side inconsistency, never a condition for failing the swap.
pub async fn run_double_check(
	ledger: Arc<dyn LedgerClient>,
	intent_id: B256,
	attempts: u32,
	backoff: Duration,
) {
	for attempt in 1..=attempts {
		match ledger.double_check(intent_id).await {
			Ok(()) => {
				tracing::debug!(%intent_id, attempt, "double-check submitted");
				return;
			},
			Err(e) => {
				tracing::warn!(%intent_id, attempt, error = %e, "double-check attempt failed");
				if attempt < attempts {
					tokio::time::sleep(backoff).await;
				}
			},
		}
	}
	tracing::warn!(%intent_id, attempts, "double-check exhausted its retry budget");
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::Address;
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::Mutex;

	fn params() -> IntentParams {
		IntentParams {
			sources: vec![(ChainId(1), U256::from(100))],
			destination_chain: ChainId(9),
			destination_token: Address::ZERO,
			destination_amount: U256::from(90),
			recipient: Address::ZERO,
		}
	}

	/// Scriptable ledger fake.
	struct FakeLedger {
		recorded: Mutex<Option<IntentParams>>,
		double_checks: AtomicU32,
		double_check_failures: u32,
		fill_hangs: bool,
	}

	impl FakeLedger {
		fn new() -> Self {
			Self {
				recorded: Mutex::new(None),
				double_checks: AtomicU32::new(0),
				double_check_failures: 0,
				fill_hangs: false,
			}
		}
	}

	#[async_trait]
	impl LedgerClient for FakeLedger {
		async fn record_intent(&self, params: &IntentParams) -> Result<B256, LedgerError> {
			*self.recorded.lock().unwrap() = Some(params.clone());
			Ok(B256::repeat_byte(0x01))
		}

		async fn await_fill(&self, _intent_id: B256) -> Result<(), LedgerError> {
			if self.fill_hangs {
				futures::future::pending::<()>().await;
			}
			Ok(())
		}

		async fn double_check(&self, _intent_id: B256) -> Result<(), LedgerError> {
			let n = self.double_checks.fetch_add(1, Ordering::SeqCst) + 1;
			if n <= self.double_check_failures {
				return Err(LedgerError::Unavailable("flaky".into()));
			}
			Ok(())
		}
	}

	fn protocol(ledger: Arc<FakeLedger>) -> IntentProtocol {
		IntentProtocol::new(
			ledger,
			IntentConfig {
				fill_timeout: Duration::from_millis(50),
				double_check_attempts: 3,
				double_check_backoff: Duration::from_millis(1),
			},
		)
	}

	#[tokio::test]
	async fn skip_bridge_resolves_immediately() {
		let ledger = Arc::new(FakeLedger::new());
		let proto = protocol(ledger);
		let mut intent = IntentProtocol::skip_bridge(params());
		assert!(intent.is_skip_bridge());
		proto.wait_for_fill(&mut intent).await.unwrap();
		assert_eq!(intent.status, IntentStatus::Filled);
	}

	#[tokio::test]
	async fn recorded_intent_reflects_realized_amounts() {
		let ledger = Arc::new(FakeLedger::new());
		let proto = protocol(ledger.clone());
		let intent = proto
			.record(params(), &[(ChainId(1), U256::from(97))])
			.await
			.unwrap();
		assert_eq!(intent.status, IntentStatus::Unfilled);
		let recorded = ledger.recorded.lock().unwrap().clone().unwrap();
		assert_eq!(recorded.sources, vec![(ChainId(1), U256::from(97))]);
	}

	#[tokio::test]
	async fn fill_marks_intent_filled() {
		let ledger = Arc::new(FakeLedger::new());
		let proto = protocol(ledger.clone());
		let mut intent = proto.record(params(), &[]).await.unwrap();
		proto.wait_for_fill(&mut intent).await.unwrap();
		assert_eq!(intent.status, IntentStatus::Filled);
	}

	#[tokio::test]
	async fn fill_timeout_is_reported() {
		let mut ledger = FakeLedger::new();
		ledger.fill_hangs = true;
		let ledger = Arc::new(ledger);
		let proto = protocol(ledger.clone());
		let mut intent = proto.record(params(), &[]).await.unwrap();
		let err = proto.wait_for_fill(&mut intent).await.unwrap_err();
		assert!(matches!(err, IntentError::FillTimeout { .. }));
		assert_eq!(intent.status, IntentStatus::Unfilled);
	}

	#[tokio::test]
	async fn double_check_retries_until_success() {
		let mut ledger = FakeLedger::new();
		ledger.double_check_failures = 2;
		let ledger = Arc::new(ledger);
		run_double_check(
			ledger.clone(),
			B256::repeat_byte(0x02),
			3,
			Duration::from_millis(1),
		)
		.await;
		assert_eq!(ledger.double_checks.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn double_check_exhaustion_is_swallowed() {
		let mut ledger = FakeLedger::new();
		ledger.double_check_failures = 10;
		let ledger = Arc::new(ledger);
		// Must return normally even though every attempt failed.
		run_double_check(
			ledger.clone(),
			B256::repeat_byte(0x03),
			3,
			Duration::from_millis(1),
		)
		.await;
		assert_eq!(ledger.double_checks.load(Ordering::SeqCst), 3);
	}
}
